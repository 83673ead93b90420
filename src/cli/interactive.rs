//! Configuração interativa do Noema.
//!
//! Este módulo implementa a configuração interativa usando dialoguer.

use std::path::{Path, PathBuf};

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use crate::types::config::Config;
use crate::NoemaResult;

/// Executa a configuração interativa.
pub fn run_interactive_config(config_path: &Path) -> NoemaResult<()> {
    let theme = ColorfulTheme::default();

    println!("\n🔧 Configuração Interativa do Noema\n");

    let mut config = if config_path.exists() {
        Config::load(config_path)?
    } else {
        println!("Criando nova configuração...\n");
        Config::default_config()
    };

    loop {
        let options = [
            "Configurações Gerais",
            "Store (snapshot)",
            "Patterns",
            "Raciocínio",
            "Aprendizado",
            "Cache",
            "Salvar e Sair",
            "Sair sem Salvar",
        ];

        let selection = Select::with_theme(&theme)
            .with_prompt("O que deseja configurar?")
            .items(&options)
            .default(0)
            .interact()?;

        match selection {
            0 => configure_general(&theme, &mut config)?,
            1 => configure_store(&theme, &mut config)?,
            2 => configure_patterns(&theme, &mut config)?,
            3 => configure_reasoning(&theme, &mut config)?,
            4 => configure_learning(&theme, &mut config)?,
            5 => configure_cache(&theme, &mut config)?,
            6 => {
                config.save(config_path)?;
                println!("\n✓ Configuração salva em: {}\n", config_path.display());
                break;
            }
            7 => {
                if Confirm::with_theme(&theme)
                    .with_prompt("Deseja realmente sair sem salvar?")
                    .default(false)
                    .interact()?
                {
                    println!("\nSaindo sem salvar.\n");
                    break;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// Pede um número em [0, 1].
fn unit_input(theme: &ColorfulTheme, prompt: &str, current: f64) -> NoemaResult<f64> {
    let value: f64 = Input::with_theme(theme)
        .with_prompt(prompt)
        .default(current)
        .interact_text()?;
    Ok(value.clamp(0.0, 1.0))
}

fn configure_general(theme: &ColorfulTheme, config: &mut Config) -> NoemaResult<()> {
    println!("\n📋 Configurações Gerais\n");

    let log_levels = ["error", "warn", "info", "debug", "trace"];
    let current_idx = log_levels
        .iter()
        .position(|&l| l == config.general.log_level)
        .unwrap_or(2);

    let log_level_idx = Select::with_theme(theme)
        .with_prompt("Nível de log")
        .items(&log_levels)
        .default(current_idx)
        .interact()?;

    config.general.log_level = log_levels[log_level_idx].to_string();

    let log_formats = ["text", "json"];
    let current_format_idx = log_formats
        .iter()
        .position(|&f| f == config.general.log_format)
        .unwrap_or(0);

    let log_format_idx = Select::with_theme(theme)
        .with_prompt("Formato de log")
        .items(&log_formats)
        .default(current_format_idx)
        .interact()?;

    config.general.log_format = log_formats[log_format_idx].to_string();

    println!("\n✓ Configurações gerais atualizadas.\n");
    Ok(())
}

fn configure_store(theme: &ColorfulTheme, config: &mut Config) -> NoemaResult<()> {
    println!("\n🗄  Store\n");

    let snapshot: String = Input::with_theme(theme)
        .with_prompt("Caminho do snapshot")
        .default(config.store.snapshot_path.display().to_string())
        .interact_text()?;

    config.store.snapshot_path = PathBuf::from(snapshot);

    config.store.autosave = Confirm::with_theme(theme)
        .with_prompt("Gravar o snapshot após cada mudança?")
        .default(config.store.autosave)
        .interact()?;

    println!("\n✓ Store configurado.\n");
    Ok(())
}

fn configure_patterns(theme: &ColorfulTheme, config: &mut Config) -> NoemaResult<()> {
    println!("\n🔍 Patterns\n");

    config.patterns.min_confidence =
        unit_input(theme, "Confiança mínima (0-1)", config.patterns.min_confidence)?;

    config.patterns.max_results = Input::with_theme(theme)
        .with_prompt("Máximo de resultados")
        .default(config.patterns.max_results)
        .interact_text()?;

    config.patterns.include_low_confidence = Confirm::with_theme(theme)
        .with_prompt("Incluir resultados de baixa confiança?")
        .default(config.patterns.include_low_confidence)
        .interact()?;

    println!("\n✓ Patterns configurados.\n");
    Ok(())
}

fn configure_reasoning(theme: &ColorfulTheme, config: &mut Config) -> NoemaResult<()> {
    println!("\n🧠 Raciocínio\n");

    config.reasoning.max_completions = Input::with_theme(theme)
        .with_prompt("Máximo de completions")
        .default(config.reasoning.max_completions)
        .interact_text()?;

    config.reasoning.explanation_separator = Input::with_theme(theme)
        .with_prompt("Separador das explicações no modo híbrido")
        .default(config.reasoning.explanation_separator.clone())
        .allow_empty(true)
        .interact_text()?;

    println!("\n✓ Raciocínio configurado.\n");
    Ok(())
}

fn configure_learning(theme: &ColorfulTheme, config: &mut Config) -> NoemaResult<()> {
    println!("\n📈 Aprendizado\n");

    let learning = &mut config.learning;

    learning.min_history_for_recommendations = Input::with_theme(theme)
        .with_prompt("Histórico mínimo para recomendações")
        .default(learning.min_history_for_recommendations)
        .interact_text()?;

    learning.effectiveness_step = unit_input(
        theme,
        "Passo de efetividade por feedback (0-1)",
        learning.effectiveness_step,
    )?;

    learning.behavior_confidence_step = unit_input(
        theme,
        "Passo de confiança por ação repetida (0-1)",
        learning.behavior_confidence_step,
    )?;

    learning.prediction_threshold = unit_input(
        theme,
        "Similaridade mínima para predição (0-1)",
        learning.prediction_threshold,
    )?;

    learning.max_predictions = Input::with_theme(theme)
        .with_prompt("Máximo de predições")
        .default(learning.max_predictions)
        .interact_text()?;

    println!("\n✓ Aprendizado configurado.\n");
    Ok(())
}

fn configure_cache(theme: &ColorfulTheme, config: &mut Config) -> NoemaResult<()> {
    println!("\n💾 Configuração do Cache\n");

    config.cache.enabled = Confirm::with_theme(theme)
        .with_prompt("Cache habilitado?")
        .default(config.cache.enabled)
        .interact()?;

    if !config.cache.enabled {
        println!("Cache desabilitado.\n");
        return Ok(());
    }

    config.cache.capacity = Input::with_theme(theme)
        .with_prompt("Capacidade máxima (número de entradas)")
        .default(config.cache.capacity)
        .interact_text()?;

    config.cache.ttl_secs = Input::with_theme(theme)
        .with_prompt("Tempo de vida (segundos)")
        .default(config.cache.ttl_secs)
        .interact_text()?;

    println!("\n✓ Cache configurado.\n");
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Sim"
    } else {
        "Não"
    }
}

/// Mostra resumo da configuração.
pub fn show_config_summary(config: &Config) {
    println!("\n📊 Resumo da Configuração\n");
    println!("┌─────────────────────────────────────────┐");
    println!("│ Geral                                   │");
    println!("├─────────────────────────────────────────┤");
    println!("│ Log level: {:<28} │", config.general.log_level);
    println!("│ Log format: {:<27} │", config.general.log_format);
    println!("├─────────────────────────────────────────┤");
    println!("│ Store                                   │");
    println!("├─────────────────────────────────────────┤");
    println!(
        "│ Snapshot: {:<29} │",
        config.store.snapshot_path.display().to_string()
    );
    println!("│ Autosave: {:<29} │", yes_no(config.store.autosave));
    println!("├─────────────────────────────────────────┤");
    println!("│ Patterns                                │");
    println!("├─────────────────────────────────────────┤");
    println!("│ Confiança mínima: {:<21} │", config.patterns.min_confidence);
    println!("│ Máx. resultados: {:<22} │", config.patterns.max_results);
    println!(
        "│ Baixa confiança: {:<22} │",
        yes_no(config.patterns.include_low_confidence)
    );
    println!("├─────────────────────────────────────────┤");
    println!("│ Raciocínio / Aprendizado                │");
    println!("├─────────────────────────────────────────┤");
    println!("│ Máx. completions: {:<21} │", config.reasoning.max_completions);
    println!(
        "│ Passo de efetividade: {:<17} │",
        config.learning.effectiveness_step
    );
    println!(
        "│ Limiar de predição: {:<19} │",
        config.learning.prediction_threshold
    );
    println!("├─────────────────────────────────────────┤");
    println!("│ Cache                                   │");
    println!("├─────────────────────────────────────────┤");
    println!("│ Habilitado: {:<27} │", yes_no(config.cache.enabled));
    if config.cache.enabled {
        println!("│ Capacidade: {:<27} │", config.cache.capacity);
        println!("│ TTL: {:<33}s │", config.cache.ttl_secs);
    }
    println!("└─────────────────────────────────────────┘");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_config_summary() {
        let mut config = Config::default_config();
        show_config_summary(&config);

        config.cache.enabled = false;
        show_config_summary(&config);
    }

    #[test]
    fn test_yes_no() {
        assert_eq!(yes_no(true), "Sim");
        assert_eq!(yes_no(false), "Não");
    }
}
