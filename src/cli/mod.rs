//! Interface de linha de comando do Noema.

pub mod commands;
pub mod interactive;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::types::config::{Config, CONFIG_FILE_NAME};
use crate::{NoemaError, NoemaResult};

/// Noema - motor cognitivo com AtomSpace, patterns, raciocínio e aprendizado.
#[derive(Parser, Debug)]
#[command(name = "noema")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Arquivo de configuração (padrão: ./noema.toml, depois o diretório do usuário).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Modo verbose.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Modo silencioso.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Comando a executar.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Caminho onde `init` e `config` gravam a configuração.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    /// Carrega a configuração efetiva.
    ///
    /// Um `--config` explícito precisa existir e ser válido; sem ele vale
    /// a busca padrão com fallback para os defaults.
    pub fn load_config(&self) -> NoemaResult<Config> {
        match &self.config {
            Some(path) => load_explicit(path),
            None => Ok(Config::load_or_default()),
        }
    }
}

fn load_explicit(path: &Path) -> NoemaResult<Config> {
    if !path.exists() {
        return Err(NoemaError::ConfigNotFound(path.display().to_string()));
    }
    Config::load(path)
}

/// Comandos disponíveis.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inicializa configuração e diretório de dados.
    Init {
        /// Diretório de destino (padrão: diretório atual).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Inicia o servidor MCP via stdio.
    Serve,

    /// Configura opções interativamente.
    Config,

    /// Diagnostica configuração e snapshot.
    Doctor,

    /// Mostra versão.
    Version,

    /// Reconhece patterns em texto, JSON ou nos atoms do store.
    Recognize {
        /// Entrada. `@arquivo` lê de arquivo.
        input: Option<String>,

        /// Interpreta a entrada como JSON (array ou objeto).
        #[arg(long)]
        json: bool,

        /// Reconhece sobre os atoms do store deste tipo.
        #[arg(long = "atom-type", conflicts_with = "input")]
        atom_type: Option<String>,

        /// Usuário cuja estratégia pondera a confiança.
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Executa uma consulta de raciocínio sobre o store.
    Reason {
        /// deductive, inductive, abductive, code-analysis, code-completion ou hybrid.
        #[arg(short = 't', long = "type")]
        reasoning_type: Option<String>,

        /// Código para análise/completion. `@arquivo` lê de arquivo.
        #[arg(long)]
        code: Option<String>,

        /// Atoms da consulta (array JSON). `@arquivo` lê de arquivo.
        #[arg(long)]
        atoms: Option<String>,

        /// Usuário cuja estratégia pondera a confiança.
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Gerencia os atoms do store.
    Atoms {
        #[command(subcommand)]
        action: AtomsCommand,
    },

    /// Exporta os atoms para um arquivo JSON.
    Export {
        /// Arquivo de saída.
        #[arg(short, long, default_value = "noema-atoms.json")]
        output: PathBuf,
    },

    /// Importa atoms de um arquivo JSON, substituindo o conteúdo.
    Import {
        /// Arquivo de entrada.
        #[arg(short, long)]
        input: PathBuf,
    },
}

/// Subcomandos de `atoms`.
#[derive(Subcommand, Debug)]
pub enum AtomsCommand {
    /// Lista atoms, opcionalmente filtrados.
    List {
        #[arg(short = 't', long = "type")]
        atom_type: Option<String>,

        #[arg(short, long)]
        name: Option<String>,

        /// Força mínima do truth value.
        #[arg(long)]
        min_strength: Option<f64>,
    },

    /// Adiciona um atom a partir de JSON.
    Add {
        /// Objeto JSON do atom. `@arquivo` lê de arquivo.
        atom: String,
    },

    /// Remove um atom pelo id.
    Remove { id: String },

    /// Mostra o número de atoms.
    Count,

    /// Remove todos os atoms.
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_reason() {
        let cli = Cli::parse_from(["noema", "reason", "-t", "deductive", "--user", "ana"]);
        match cli.command {
            Commands::Reason {
                reasoning_type,
                user,
                ..
            } => {
                assert_eq!(reasoning_type.as_deref(), Some("deductive"));
                assert_eq!(user.as_deref(), Some("ana"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["noema", "atoms", "count", "--quiet", "-c", "x.toml"]);
        assert!(cli.quiet);
        assert_eq!(cli.config_path(), PathBuf::from("x.toml"));
    }

    #[test]
    fn test_default_config_path() {
        let cli = Cli::parse_from(["noema", "version"]);
        assert_eq!(cli.config_path(), PathBuf::from(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_explicit_missing_config_fails() {
        let cli = Cli::parse_from(["noema", "-c", "/definitely/missing/noema.toml", "version"]);
        assert!(matches!(cli.load_config(), Err(NoemaError::ConfigNotFound(_))));
    }
}
