//! Controlled vocabularies offered by the form's select inputs.
//!
//! Each list pairs the value sent to the backend with the label shown to the
//! user. Values are stored in the form as plain strings; these lists exist for
//! presentation and for hinting at valid input.

/// A `(value, label)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectOption {
    /// The value stored and sent to the backend.
    pub value: &'static str,
    /// The label shown to the user.
    pub label: &'static str,
}

const fn opt(value: &'static str, label: &'static str) -> SelectOption {
    SelectOption { value, label }
}

/// `identification.type`
pub const REQUEST_TYPES: &[SelectOption] = &[
    opt("Emergencial", "Emergencial"),
    opt("Normal", "Normal"),
    opt("Padrão", "Padrão"),
];

/// `category.objective`
pub const OBJECTIVE_TYPES: &[SelectOption] = &[
    opt("Ajuste", "Ajuste"),
    opt("Alteração", "Alteração"),
    opt("Ativação", "Ativação"),
    opt("Atualização", "Atualização"),
    opt("Conserto", "Conserto"),
    opt("Desativação", "Desativação"),
    opt("Implantação", "Implantação"),
    opt("Manutenção", "Manutenção"),
    opt("Substituição", "Substituição"),
];

/// `category.action`
pub const ACTION_TYPES: &[SelectOption] = &[
    opt("Correção", "Correção"),
    opt("Manutenção", "Manutenção"),
    opt("Melhoria", "Melhoria"),
];

/// `category.impact`, `category.urgency` and probability of success.
pub const LEVEL_TYPES: &[SelectOption] = &[
    opt("Baixo", "Baixo"),
    opt("Medio", "Médio"),
    opt("Alto", "Alto"),
];

/// `impactCategory.activity`
pub const ACTIVITY_TYPES: &[SelectOption] = &[
    opt("Ajuste", "Ajuste"),
    opt("Ativação", "Ativação"),
    opt("Atualização", "Atualização"),
    opt("Conserto", "Conserto"),
    opt("Desativação", "Desativação"),
    opt("Manutenção", "Manutenção"),
    opt("Substituição", "Substituição"),
];

/// `impactCategory.environment`
pub const ENVIRONMENT_TYPES: &[SelectOption] = &[
    opt("Produção", "Produção"),
    opt("Homologação", "Homologação"),
    opt("Desenvolvimento", "Desenvolvimento"),
];

/// `deploymentWindow.impactType`
pub const IMPACT_TYPES: &[SelectOption] = &[
    opt("Atualização", "Atualização"),
    opt("Correção", "Correção"),
    opt("Degradação", "Degradação"),
    opt("Indisponibilidade", "Indisponibilidade"),
    opt("Intermitência", "Intermitência"),
];

/// `planComunication.moment`
pub const MOMENTS: &[SelectOption] = &[
    opt("Antes", "Antes"),
    opt("Durante", "Durante"),
    opt("Depois", "Depois"),
    opt("Todos", "Todos"),
];

/// `planComunication.comunicationType`
pub const COMMUNICATION_TYPES: &[SelectOption] = &[
    opt("Email", "E-mail"),
    opt("Teams", "Teams"),
    opt("Telefone", "Telefone"),
];

/// Every `technologyArea` field.
pub const TECHNOLOGY_AREAS: &[SelectOption] = &[
    opt("BancoDeDados", "Banco de Dados"),
    opt("Linux", "Linux"),
    opt("Windows", "Windows"),
    opt("Redes", "Redes"),
];

/// `phases.*.stage`
pub const STAGES: &[SelectOption] = &[
    opt("Antes", "Antes"),
    opt("Depois", "Depois"),
    opt("Durante", "Durante"),
];

/// Looks up the label for `value`.
///
/// The level list also accepts lower-case values (`medio` → `Médio`).
#[must_use]
pub fn label_for(options: &[SelectOption], value: &str) -> Option<&'static str> {
    options
        .iter()
        .find(|option| option.value == value)
        .or_else(|| {
            options
                .iter()
                .find(|option| option.value.to_lowercase() == value.to_lowercase())
        })
        .map(|option| option.label)
}

/// The label for `value`, or the value itself when it is not in the list.
#[must_use]
pub fn display_value<'a>(options: &[SelectOption], value: &'a str) -> &'a str {
    label_for(options, value).unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TechnologyArea;

    #[test]
    fn labels_are_found() {
        assert_eq!(label_for(LEVEL_TYPES, "Medio"), Some("Médio"));
        assert_eq!(label_for(LEVEL_TYPES, "medio"), Some("Médio"));
        assert_eq!(label_for(COMMUNICATION_TYPES, "Email"), Some("E-mail"));
        assert_eq!(label_for(STAGES, "Nunca"), None);
    }

    #[test]
    fn display_value_falls_back() {
        assert_eq!(display_value(TECHNOLOGY_AREAS, "BancoDeDados"), "Banco de Dados");
        assert_eq!(display_value(TECHNOLOGY_AREAS, "Mainframe"), "Mainframe");
    }

    #[test]
    fn technology_area_list_matches_enum() {
        for (option, area) in TECHNOLOGY_AREAS.iter().zip(TechnologyArea::ALL) {
            assert_eq!(option.value, area.as_str());
            assert_eq!(option.label, area.label());
        }
    }
}
