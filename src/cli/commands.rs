//! Implementação dos comandos CLI do Noema.
//!
//! Resultados vão para stdout (JSON quando estruturados); logs vão
//! para stderr.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::atoms::{parse_blob, Atom, AtomPattern};
use crate::engine::CognitiveEngine;
use crate::patterns::catalog;
use crate::reasoning::{ReasoningContext, ReasoningQuery};
use crate::types::config::{Config, CONFIG_FILE_NAME};
use crate::NoemaResult;

use super::AtomsCommand;

const DATA_DIR: &str = ".noema";

/// Lê o valor literal ou, com prefixo `@`, o conteúdo do arquivo.
fn read_arg(value: &str) -> NoemaResult<String> {
    match value.strip_prefix('@') {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => Ok(value.to_string()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> NoemaResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Grava o snapshot depois de uma mutação feita pela CLI.
fn persist(engine: &CognitiveEngine) -> NoemaResult<()> {
    if engine.persist()? {
        tracing::debug!("Snapshot written");
    } else {
        tracing::debug!("Autosave disabled, snapshot not written");
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
// Setup
// ═══════════════════════════════════════════════════════════════════════════

/// Initializes configuration in the specified directory.
pub async fn init(path: Option<PathBuf>) -> NoemaResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join(CONFIG_FILE_NAME);

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        println!("Use 'noema config' to modify.");
        return Ok(());
    }

    let data_dir = target_dir.join(DATA_DIR);
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!(".noema/ directory created");
    }

    update_gitignore(&target_dir)?;

    let config = Config::default_config();
    config.save(&config_path)?;

    println!("Noema initialized successfully!");
    println!("Configuration created at: {}", config_path.display());
    println!("Snapshot: {}", config.store.snapshot_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Check the setup: noema doctor");
    println!("  2. Configure options: noema config");
    println!("  3. Register the MCP server: <client> mcp add noema -- noema serve");

    Ok(())
}

/// Adds `.noema/` to .gitignore, creating the file when needed.
fn update_gitignore(target_dir: &Path) -> NoemaResult<()> {
    let gitignore_path = target_dir.join(".gitignore");
    let entry = ".noema/";
    let comment = "# Noema - local atom snapshot";

    if gitignore_path.exists() {
        let content = std::fs::read_to_string(&gitignore_path)?;

        if content
            .lines()
            .any(|line| line.trim() == entry || line.trim() == DATA_DIR)
        {
            tracing::debug!(".gitignore already contains .noema/");
            return Ok(());
        }

        let mut new_content = content.trim_end().to_string();
        if !new_content.is_empty() {
            new_content.push_str("\n\n");
        }
        new_content.push_str(comment);
        new_content.push('\n');
        new_content.push_str(entry);
        new_content.push('\n');

        std::fs::write(&gitignore_path, new_content)?;
        println!(".gitignore updated with .noema/");
    } else {
        std::fs::write(&gitignore_path, format!("{}\n{}\n", comment, entry))?;
        println!(".gitignore created with .noema/");
    }

    Ok(())
}

/// Inicia o servidor MCP via stdio.
pub async fn serve(config: &Config) -> NoemaResult<()> {
    use crate::mcp::McpServer;

    tracing::debug!(
        snapshot = %config.store.snapshot_path.display(),
        autosave = config.store.autosave,
        "Starting MCP server over stdio"
    );

    let mut server = McpServer::new(config.clone())?;
    server.run().await
}

/// Configura opções interativamente.
pub async fn config_cmd(config_path: &Path) -> NoemaResult<()> {
    use super::interactive::{run_interactive_config, show_config_summary};

    if config_path.exists() {
        let config = Config::load(config_path)?;
        show_config_summary(&config);
    }

    run_interactive_config(config_path)
}

/// Resultado do diagnóstico.
#[derive(Debug, Default)]
pub struct DoctorReport {
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
}

impl DoctorReport {
    pub fn is_healthy(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Verifica a configuração e o snapshot sem alterar nada.
pub fn diagnose(config: &Config) -> DoctorReport {
    let mut report = DoctorReport::default();

    let snapshot = &config.store.snapshot_path;
    if snapshot.exists() {
        match std::fs::read_to_string(snapshot)
            .map_err(crate::NoemaError::from)
            .and_then(|blob| parse_blob(&blob))
        {
            Ok(atoms) => println!("✓ Snapshot OK ({} atoms)", atoms.len()),
            Err(e) => report
                .issues
                .push(format!("Snapshot {} is invalid: {}", snapshot.display(), e)),
        }
    } else {
        report.warnings.push(format!(
            "Snapshot {} does not exist yet (created on first mutation)",
            snapshot.display()
        ));
    }

    if !config.store.autosave {
        report
            .warnings
            .push("Autosave is disabled - changes are lost on exit".to_string());
    }

    println!("✓ {} code detectors compiled", catalog().len());

    let learning = &config.learning;
    for (name, value) in [
        ("effectiveness_step", learning.effectiveness_step),
        ("behavior_confidence_step", learning.behavior_confidence_step),
        ("prediction_threshold", learning.prediction_threshold),
    ] {
        if !(0.0..=1.0).contains(&value) {
            report
                .issues
                .push(format!("learning.{} must be within [0, 1] (got {})", name, value));
        }
    }

    if !(0.0..=1.0).contains(&config.patterns.min_confidence) {
        report.issues.push(format!(
            "patterns.min_confidence must be within [0, 1] (got {})",
            config.patterns.min_confidence
        ));
    }

    if config.patterns.max_results == 0 {
        report
            .warnings
            .push("patterns.max_results is 0 - recognition returns nothing".to_string());
    }

    if config.cache.enabled && config.cache.capacity == 0 {
        report
            .warnings
            .push("cache.capacity is 0 - the cache is effectively disabled".to_string());
    }

    if !["text", "json"].contains(&config.general.log_format.as_str()) {
        report.warnings.push(format!(
            "Unknown log_format '{}', falling back to text",
            config.general.log_format
        ));
    }

    report
}

/// Diagnostica problemas de configuração.
pub async fn doctor(config: &Config) -> NoemaResult<()> {
    println!("Diagnosing Noema configuration...\n");
    println!("✓ Configuration loaded");

    let report = diagnose(config);

    println!();
    if report.issues.is_empty() && report.warnings.is_empty() {
        println!("✓ All good! Noema is ready to use.");
    } else {
        if !report.warnings.is_empty() {
            println!("Warnings:");
            for warning in &report.warnings {
                println!("  ⚠ {}", warning);
            }
        }
        if !report.issues.is_empty() {
            println!("Problems:");
            for issue in &report.issues {
                println!("  ✗ {}", issue);
            }
        }
    }

    Ok(())
}

/// Mostra versão.
pub fn version() {
    println!("noema {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Cognitive knowledge engine: AtomSpace, patterns, reasoning and learning");
}

// ═══════════════════════════════════════════════════════════════════════════
// Motor
// ═══════════════════════════════════════════════════════════════════════════

/// Reconhece patterns e imprime o resultado em JSON.
pub async fn recognize(
    input: Option<&str>,
    json: bool,
    atom_type: Option<&str>,
    user: Option<&str>,
    config: &Config,
) -> NoemaResult<()> {
    let mut engine = CognitiveEngine::open(config.clone())?;

    let patterns = match (atom_type, input) {
        (Some(atom_type), _) => engine.recognize_atom_patterns(&AtomPattern::of_type(atom_type), user),
        (None, Some(input)) => {
            let raw = read_arg(input)?;
            let value = if json {
                serde_json::from_str(&raw)?
            } else {
                Value::String(raw)
            };
            engine.recognize_patterns(&value, None, user)
        }
        (None, None) => engine.recognize_atom_patterns(&AtomPattern::any(), user),
    };

    tracing::info!(patterns = patterns.len(), "Recognition finished");
    print_json(&patterns)
}

/// Executa uma consulta de raciocínio e imprime o resultado em JSON.
pub async fn reason(
    reasoning_type: Option<&str>,
    code: Option<&str>,
    atoms: Option<&str>,
    user: Option<&str>,
    config: &Config,
) -> NoemaResult<()> {
    let mut engine = CognitiveEngine::open(config.clone())?;

    let atoms: Vec<Atom> = match atoms {
        Some(raw) => serde_json::from_str(&read_arg(raw)?)?,
        None => Vec::new(),
    };

    let query = ReasoningQuery {
        reasoning_type: reasoning_type.map(Into::into),
        atoms,
        context: ReasoningContext {
            code: code.map(read_arg).transpose()?,
            user_id: user.map(str::to_string),
            ..ReasoningContext::default()
        },
        ..ReasoningQuery::default()
    };

    let result = engine.reason(&query);
    print_json(&result)
}

/// Gerencia atoms do store.
pub async fn atoms(action: &AtomsCommand, config: &Config) -> NoemaResult<()> {
    let mut engine = CognitiveEngine::open(config.clone())?;

    match action {
        AtomsCommand::List {
            atom_type,
            name,
            min_strength,
        } => {
            let pattern = AtomPattern {
                atom_type: atom_type.as_deref().map(Into::into),
                name: name.clone(),
                min_strength: *min_strength,
                ..AtomPattern::default()
            };
            print_json(&engine.query_atoms(&pattern))?;
        }
        AtomsCommand::Add { atom } => {
            let atom: Atom = serde_json::from_str(&read_arg(atom)?)?;
            let id = engine.add_atom(atom);
            persist(&engine)?;
            println!("{}", id);
        }
        AtomsCommand::Remove { id } => {
            if engine.remove_atom(id) {
                persist(&engine)?;
                println!("Removed: {}", id);
            } else {
                println!("Atom not found: {}", id);
            }
        }
        AtomsCommand::Count => {
            println!("{}", engine.atom_count());
        }
        AtomsCommand::Clear => {
            let count = engine.atom_count();
            engine.clear_atoms();
            persist(&engine)?;
            println!("Cleared {} atoms", count);
        }
    }

    Ok(())
}

/// Exporta os atoms do snapshot para um arquivo.
pub async fn export_atoms(output: &Path, config: &Config) -> NoemaResult<()> {
    let engine = CognitiveEngine::open(config.clone())?;
    engine.store().export_to_file(output)?;

    println!("{} atoms exported to: {}", engine.atom_count(), output.display());
    Ok(())
}

/// Importa atoms de um arquivo, substituindo o snapshot.
///
/// O arquivo é validado por inteiro antes de qualquer mudança.
pub async fn import_atoms(input: &Path, config: &Config) -> NoemaResult<()> {
    let blob = std::fs::read_to_string(input)?;

    let mut engine = CognitiveEngine::open(config.clone())?;
    let count = engine.import_atoms(&blob)?;
    persist(&engine)?;

    println!("Import complete: {} atoms", count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> Config {
        let mut config = Config::default_config();
        config.store.snapshot_path = dir.path().join("atoms.json");
        config
    }

    #[test]
    fn test_version() {
        version();
    }

    #[test]
    fn test_read_arg_literal_and_file() {
        assert_eq!(read_arg("x = 1").unwrap(), "x = 1");

        let dir = TempDir::new().unwrap();
        let file = dir.path().join("code.rs");
        std::fs::write(&file, "fn main() {}").unwrap();
        assert_eq!(read_arg(&format!("@{}", file.display())).unwrap(), "fn main() {}");
    }

    #[tokio::test]
    async fn test_init_creates_files() {
        let dir = TempDir::new().unwrap();
        init(Some(dir.path().to_path_buf())).await.unwrap();

        assert!(dir.path().join(CONFIG_FILE_NAME).exists());
        assert!(dir.path().join(DATA_DIR).is_dir());
        let gitignore = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert!(gitignore.contains(".noema/"));

        // Segunda execução não duplica a entrada
        update_gitignore(dir.path()).unwrap();
        let again = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(again.matches(".noema/").count(), 1);
    }

    #[tokio::test]
    async fn test_atoms_add_persists() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        atoms(
            &AtomsCommand::Add {
                atom: r#"{"type":"ConceptNode","name":"cat"}"#.to_string(),
            },
            &config,
        )
        .await
        .unwrap();

        let engine = CognitiveEngine::open(config).unwrap();
        assert_eq!(engine.atom_count(), 1);
    }

    #[tokio::test]
    async fn test_import_invalid_keeps_snapshot() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        atoms(
            &AtomsCommand::Add {
                atom: r#"{"type":"ConceptNode","name":"dog"}"#.to_string(),
            },
            &config,
        )
        .await
        .unwrap();

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, r#"[{"type":"ConceptNode","bogus":1}]"#).unwrap();
        assert!(import_atoms(&bad, &config).await.is_err());

        let engine = CognitiveEngine::open(config).unwrap();
        assert_eq!(engine.atom_count(), 1);
    }

    #[test]
    fn test_diagnose_flags_bad_values() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        config.learning.prediction_threshold = 1.5;

        let report = diagnose(&config);
        assert!(!report.is_healthy());
        assert!(report.issues.iter().any(|i| i.contains("prediction_threshold")));
        // Snapshot ainda não existe
        assert!(!report.warnings.is_empty());
    }

    #[test]
    fn test_diagnose_invalid_snapshot() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        std::fs::write(&config.store.snapshot_path, "not json").unwrap();

        assert!(!diagnose(&config).is_healthy());
    }
}
