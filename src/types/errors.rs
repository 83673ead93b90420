//! Tipos de erro do Noema.

use thiserror::Error;

/// Tipo de resultado padrão do Noema.
pub type NoemaResult<T> = Result<T, NoemaError>;

/// Erros possíveis no Noema.
///
/// Apenas falhas estruturais viram erro. Resultados vazios ou de baixa
/// confiança são sempre representados como valores válidos.
#[derive(Error, Debug)]
pub enum NoemaError {
    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro ao parsear TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Erro ao serializar TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Erro de JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Dados de importação inválidos: {0}")]
    Import(String),

    #[error("Modelo de aprendizado '{0}' não encontrado")]
    ModelNotFound(String),

    #[error("Falha na estratégia de raciocínio: {0}")]
    Reasoning(String),

    #[error("Erro no servidor MCP: {0}")]
    McpServer(String),

    #[error("Configuração não encontrada em: {0}")]
    ConfigNotFound(String),

    #[cfg(feature = "cli")]
    #[error("Erro no prompt interativo: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("{0}")]
    Other(String),
}

impl NoemaError {
    /// Cria um erro genérico.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Cria um erro de configuração.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Cria um erro de importação.
    pub fn import<S: Into<String>>(msg: S) -> Self {
        Self::Import(msg.into())
    }

    /// Cria um erro interno de estratégia de raciocínio.
    pub fn reasoning<S: Into<String>>(msg: S) -> Self {
        Self::Reasoning(msg.into())
    }
}
