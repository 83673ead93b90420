//! Modelo de dados dos Atoms.
//!
//! Um Atom é um nó ou aresta tipado do grafo de conhecimento, com
//! anotações opcionais de verdade (TruthValue) e atenção (AttentionValue).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tipo de um Atom.
///
/// Catálogo fechado com variante `Custom` para tipos desconhecidos.
/// Serializado como a string pura (ex.: `"ConceptNode"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AtomType {
    ConceptNode,
    PredicateNode,
    VariableNode,
    NumberNode,
    FunctionNode,
    ClassNode,
    ModuleNode,
    InheritanceLink,
    ImplicationLink,
    EvaluationLink,
    MemberLink,
    SimilarityLink,
    ListLink,
    /// Tipo fora do catálogo.
    Custom(String),
}

impl AtomType {
    /// Nome canônico do tipo.
    pub fn as_str(&self) -> &str {
        match self {
            AtomType::ConceptNode => "ConceptNode",
            AtomType::PredicateNode => "PredicateNode",
            AtomType::VariableNode => "VariableNode",
            AtomType::NumberNode => "NumberNode",
            AtomType::FunctionNode => "FunctionNode",
            AtomType::ClassNode => "ClassNode",
            AtomType::ModuleNode => "ModuleNode",
            AtomType::InheritanceLink => "InheritanceLink",
            AtomType::ImplicationLink => "ImplicationLink",
            AtomType::EvaluationLink => "EvaluationLink",
            AtomType::MemberLink => "MemberLink",
            AtomType::SimilarityLink => "SimilarityLink",
            AtomType::ListLink => "ListLink",
            AtomType::Custom(name) => name,
        }
    }

    /// Links conectam outros atoms via `outgoing`.
    pub fn is_link(&self) -> bool {
        self.as_str().ends_with("Link")
    }
}

impl From<String> for AtomType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ConceptNode" => AtomType::ConceptNode,
            "PredicateNode" => AtomType::PredicateNode,
            "VariableNode" => AtomType::VariableNode,
            "NumberNode" => AtomType::NumberNode,
            "FunctionNode" => AtomType::FunctionNode,
            "ClassNode" => AtomType::ClassNode,
            "ModuleNode" => AtomType::ModuleNode,
            "InheritanceLink" => AtomType::InheritanceLink,
            "ImplicationLink" => AtomType::ImplicationLink,
            "EvaluationLink" => AtomType::EvaluationLink,
            "MemberLink" => AtomType::MemberLink,
            "SimilarityLink" => AtomType::SimilarityLink,
            "ListLink" => AtomType::ListLink,
            _ => AtomType::Custom(s),
        }
    }
}

impl From<&str> for AtomType {
    fn from(s: &str) -> Self {
        AtomType::from(s.to_string())
    }
}

impl From<AtomType> for String {
    fn from(t: AtomType) -> Self {
        match t {
            AtomType::Custom(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for AtomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Grau de verdade: quão verdadeiro e quão certo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TruthValue {
    /// Força da crença (0.0 - 1.0).
    pub strength: f64,
    /// Certeza sobre a força (0.0 - 1.0).
    pub confidence: f64,
}

impl TruthValue {
    /// Cria um TruthValue com valores limitados a [0, 1].
    pub fn new(strength: f64, confidence: f64) -> Self {
        Self {
            strength: clamp_unit(strength),
            confidence: clamp_unit(confidence),
        }
    }

    /// Verifica se ambos os componentes estão em [0, 1].
    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.strength) && (0.0..=1.0).contains(&self.confidence)
    }
}

impl Default for TruthValue {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// Importância de curto, longo e muito longo prazo.
///
/// Nenhum componente aplica decaimento; os valores são preservados
/// verbatim em toda mutação que não os sobrescreva.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttentionValue {
    pub sti: f64,
    pub lti: f64,
    pub vlti: f64,
}

/// Um nó ou aresta tipado do grafo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Atom {
    /// Identificador opaco. Atribuído pelo AtomStore quando ausente.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Tipo do atom.
    #[serde(rename = "type")]
    pub atom_type: AtomType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truth_value: Option<TruthValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attention_value: Option<AttentionValue>,

    /// Filhos ordenados (para links).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outgoing: Option<Vec<Atom>>,

    /// Pais conhecidos.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incoming: Option<Vec<Atom>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl Atom {
    /// Cria um atom sem nome.
    pub fn new(atom_type: impl Into<AtomType>) -> Self {
        Self {
            id: None,
            atom_type: atom_type.into(),
            name: None,
            truth_value: None,
            attention_value: None,
            outgoing: None,
            incoming: None,
            metadata: None,
        }
    }

    /// Cria um nó nomeado.
    pub fn node(atom_type: impl Into<AtomType>, name: impl Into<String>) -> Self {
        Self::new(atom_type).with_name(name)
    }

    /// Cria um link sobre os atoms dados.
    pub fn link(atom_type: impl Into<AtomType>, outgoing: Vec<Atom>) -> Self {
        Self::new(atom_type).with_outgoing(outgoing)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_truth(mut self, strength: f64, confidence: f64) -> Self {
        self.truth_value = Some(TruthValue::new(strength, confidence));
        self
    }

    pub fn with_attention(mut self, attention: AttentionValue) -> Self {
        self.attention_value = Some(attention);
        self
    }

    pub fn with_outgoing(mut self, outgoing: Vec<Atom>) -> Self {
        self.outgoing = Some(outgoing);
        self
    }

    /// Adiciona uma entrada de metadata.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }

    /// Id do atom, ou string vazia se ainda não atribuído.
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }

    /// Filhos do atom (vazio para nós).
    pub fn outgoing_atoms(&self) -> &[Atom] {
        self.outgoing.as_deref().unwrap_or(&[])
    }

    /// Força da verdade, com 1.0 quando não anotada.
    pub fn strength(&self) -> f64 {
        self.truth_value.map(|tv| tv.strength).unwrap_or(1.0)
    }

    /// Confiança da verdade, com 1.0 quando não anotada.
    pub fn confidence(&self) -> f64 {
        self.truth_value.map(|tv| tv.confidence).unwrap_or(1.0)
    }

    /// Chave estrutural: `Tipo:nome` para nós, `Tipo(k1,k2)` para links.
    ///
    /// Dois atoms com a mesma chave representam a mesma proposição,
    /// independentemente do id.
    pub fn key(&self) -> String {
        if self.atom_type.is_link() || self.outgoing.is_some() {
            let children: Vec<String> = self.outgoing_atoms().iter().map(Atom::key).collect();
            format!("{}({})", self.atom_type, children.join(","))
        } else {
            format!("{}:{}", self.atom_type, self.name.as_deref().unwrap_or(""))
        }
    }

    /// Verifica recursivamente se todos os truth values estão em [0, 1].
    pub fn has_valid_truth(&self) -> bool {
        self.truth_value.map(|tv| tv.is_valid()).unwrap_or(true)
            && self.outgoing_atoms().iter().all(Atom::has_valid_truth)
            && self
                .incoming
                .as_deref()
                .unwrap_or(&[])
                .iter()
                .all(Atom::has_valid_truth)
    }
}

/// Descritor de consulta. Campos ausentes são curingas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomPattern {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub atom_type: Option<AtomType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Força mínima do TruthValue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_strength: Option<f64>,

    /// Confiança mínima do TruthValue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_confidence: Option<f64>,

    /// STI mínimo do AttentionValue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_sti: Option<f64>,
}

impl AtomPattern {
    /// Padrão que aceita qualquer atom.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn of_type(atom_type: impl Into<AtomType>) -> Self {
        Self {
            atom_type: Some(atom_type.into()),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_min_strength(mut self, strength: f64) -> Self {
        self.min_strength = Some(strength);
        self
    }

    pub fn with_min_confidence(mut self, confidence: f64) -> Self {
        self.min_confidence = Some(confidence);
        self
    }

    pub fn with_min_sti(mut self, sti: f64) -> Self {
        self.min_sti = Some(sti);
        self
    }

    /// Um atom casa sse todo campo presente do padrão é igual (ou
    /// excedido, no caso dos limiares) ao campo correspondente do atom.
    pub fn matches(&self, atom: &Atom) -> bool {
        if let Some(ref t) = self.atom_type {
            if *t != atom.atom_type {
                return false;
            }
        }

        if let Some(ref name) = self.name {
            if atom.name.as_deref() != Some(name.as_str()) {
                return false;
            }
        }

        if let Some(min) = self.min_strength {
            match atom.truth_value {
                Some(tv) if tv.strength >= min => {}
                _ => return false,
            }
        }

        if let Some(min) = self.min_confidence {
            match atom.truth_value {
                Some(tv) if tv.confidence >= min => {}
                _ => return false,
            }
        }

        if let Some(min) = self.min_sti {
            match atom.attention_value {
                Some(av) if av.sti >= min => {}
                _ => return false,
            }
        }

        true
    }
}

/// Atualização parcial de um atom. Campos `None` são preservados.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AtomUpdate {
    #[serde(default, rename = "type")]
    pub atom_type: Option<AtomType>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub truth_value: Option<TruthValue>,
    #[serde(default)]
    pub attention_value: Option<AttentionValue>,
    #[serde(default)]
    pub outgoing: Option<Vec<Atom>>,
    #[serde(default)]
    pub incoming: Option<Vec<Atom>>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

impl AtomUpdate {
    /// Aplica a atualização sobre o atom, mantendo o id.
    pub fn apply_to(self, atom: &mut Atom) {
        if let Some(t) = self.atom_type {
            atom.atom_type = t;
        }
        if let Some(name) = self.name {
            atom.name = Some(name);
        }
        if let Some(tv) = self.truth_value {
            atom.truth_value = Some(TruthValue::new(tv.strength, tv.confidence));
        }
        if let Some(av) = self.attention_value {
            atom.attention_value = Some(av);
        }
        if let Some(outgoing) = self.outgoing {
            atom.outgoing = Some(outgoing);
        }
        if let Some(incoming) = self.incoming {
            atom.incoming = Some(incoming);
        }
        if let Some(metadata) = self.metadata {
            atom.metadata = Some(metadata);
        }
    }
}

/// Limita um valor a [0, 1]. NaN vira 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
