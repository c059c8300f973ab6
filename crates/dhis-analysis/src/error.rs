//! Unmet view preconditions.

use thiserror::Error;

/// Why a view has nothing to show. Informational, never a failure: the
/// message is displayed in place of the view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RenderPrecondition {
    #[error("Aucune donnée pour l'analyse")]
    EmptyTable,

    #[error("Aucune colonne temporelle détectée pour l'analyse")]
    NoTemporalColumn,

    #[error("Aucune variable numérique disponible pour l'analyse")]
    NoNumericColumn,

    #[error("Aucune colonne géographique détectée")]
    NoGeographicColumn,

    #[error("Aucun indicateur de performance détecté")]
    NoPerformanceColumn,

    #[error("Aucune variable catégorielle disponible pour l'analyse")]
    NoCategoricalColumn,

    #[error("Au moins 2 variables numériques requises")]
    TooFewNumericColumns,

    #[error("Les variables X et Y doivent être différentes")]
    SameVariable,

    #[error("Données insuffisantes pour la régression ({rows} lignes complètes, plus de {required} requises)")]
    TooFewRows { rows: usize, required: usize },

    #[error("Colonne introuvable: {0}")]
    UnknownColumn(String),

    #[error("La colonne « {column} » n'est pas utilisable comme variable {expected}")]
    UnsuitableColumn {
        column: String,
        expected: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, RenderPrecondition>;
