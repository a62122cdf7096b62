use std::{fmt, str::FromStr};

use crate::error::RelayError;

/// The experts a question can be addressed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Persona {
    DataScientist,
    SoftwareEngineer,
    MarketingConsultant,
    FinancialAdvisor,
}

impl Persona {
    pub const ALL: [Persona; 4] = [
        Persona::DataScientist,
        Persona::SoftwareEngineer,
        Persona::MarketingConsultant,
        Persona::FinancialAdvisor,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Persona::DataScientist => "data-scientist",
            Persona::SoftwareEngineer => "software-engineer",
            Persona::MarketingConsultant => "marketing-consultant",
            Persona::FinancialAdvisor => "financial-advisor",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Persona::DataScientist => "Data Scientist",
            Persona::SoftwareEngineer => "Software Engineer",
            Persona::MarketingConsultant => "Marketing Consultant",
            Persona::FinancialAdvisor => "Financial Advisor",
        }
    }

    /// System instruction sent ahead of the user's question.
    pub fn instruction(self) -> &'static str {
        match self {
            Persona::DataScientist => "You are a data science expert. Answer questions about statistics, machine learning, and data analysis in detail.",
            Persona::SoftwareEngineer => "You are a software development expert. Answer questions about programming, architecture design, and best practices in detail.",
            Persona::MarketingConsultant => "You are a marketing expert. Answer questions about brand strategy, digital marketing, and customer analysis in detail.",
            Persona::FinancialAdvisor => "You are a finance and investment expert. Answer questions about investment strategy, financial planning, and risk management in detail.",
        }
    }

    /// Parse a menu answer: either a 1-based index into `ALL` or anything `FromStr` accepts.
    pub fn from_selection(selection: &str) -> Result<Self, RelayError> {
        let selection = selection.trim();
        if let Ok(index) = selection.parse::<usize>() {
            return index
                .checked_sub(1)
                .and_then(|i| Self::ALL.get(i).copied())
                .ok_or_else(|| RelayError::InvalidPersona(selection.to_string()));
        }
        selection.parse()
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn normalize(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            ' ' | '_' => '-',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

impl FromStr for Persona {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Self::ALL
            .into_iter()
            .find(|persona| persona.id() == wanted)
            .ok_or_else(|| RelayError::InvalidPersona(s.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn every_persona_has_an_instruction() {
        for persona in Persona::ALL {
            assert!(!persona.instruction().is_empty(), "{persona:?}");
            assert!(!persona.label().is_empty(), "{persona:?}");
        }
    }

    #[test]
    fn instructions_are_distinct() {
        for a in Persona::ALL {
            for b in Persona::ALL {
                if a != b {
                    assert_ne!(a.instruction(), b.instruction());
                }
            }
        }
    }

    #[test]
    fn data_scientist_instruction_names_the_domain() {
        assert!(Persona::DataScientist
            .instruction()
            .contains("data science expert"));
    }

    #[test]
    fn parses_ids_and_labels() {
        assert_eq!(
            "data-scientist".parse::<Persona>().unwrap(),
            Persona::DataScientist
        );
        assert_eq!(
            "Software Engineer".parse::<Persona>().unwrap(),
            Persona::SoftwareEngineer
        );
        assert_eq!(
            "marketing_consultant".parse::<Persona>().unwrap(),
            Persona::MarketingConsultant
        );
        assert_eq!(
            " FINANCIAL advisor ".parse::<Persona>().unwrap(),
            Persona::FinancialAdvisor
        );
    }

    #[test]
    fn rejects_unknown_persona() {
        match "Astrologer".parse::<Persona>() {
            Err(RelayError::InvalidPersona(name)) => assert_eq!(name, "Astrologer"),
            other => panic!("expected InvalidPersona, got {other:?}"),
        }
    }

    #[test]
    fn selection_by_index() {
        assert_eq!(
            Persona::from_selection("1").unwrap(),
            Persona::DataScientist
        );
        assert_eq!(
            Persona::from_selection("4\n").unwrap(),
            Persona::FinancialAdvisor
        );
        assert!(Persona::from_selection("0").is_err());
        assert!(Persona::from_selection("5").is_err());
        assert_eq!(
            Persona::from_selection("software engineer").unwrap(),
            Persona::SoftwareEngineer
        );
    }
}
