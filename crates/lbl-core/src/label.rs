//! The fixed label taxonomy

use std::fmt;
use std::str::FromStr;

use crate::error::LabelError;

/// One of the ten categories an annotator can assign to a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Help,
    Listen,
    Comfort,
    Encourage,
    Explain,
    Advise,
    Cooperate,
    Warn,
    Ignore,
    Denigrate,
}

/// All labels in display order
pub const LABELS: [Label; 10] = [
    Label::Help,
    Label::Listen,
    Label::Comfort,
    Label::Encourage,
    Label::Explain,
    Label::Advise,
    Label::Cooperate,
    Label::Warn,
    Label::Ignore,
    Label::Denigrate,
];

impl Label {
    /// The key stored in the annotator column
    pub fn key(&self) -> &'static str {
        match self {
            Label::Help => "help",
            Label::Listen => "listen",
            Label::Comfort => "comfort",
            Label::Encourage => "encourage",
            Label::Explain => "explain",
            Label::Advise => "advise",
            Label::Cooperate => "cooperate",
            Label::Warn => "warn",
            Label::Ignore => "ignore",
            Label::Denigrate => "denigrate",
        }
    }
    
    /// Codebook description shown on the label card
    pub fn description(&self) -> &'static str {
        match self {
            Label::Help => "Praktisch helfen; konkrete Unterstützung oder Umsetzung anbieten",
            Label::Listen => "Zuhören; nachfragen, klären oder Raum geben, damit die Person mehr schildert",
            Label::Comfort => "Trösten oder validieren; Gefühle anerkennen und normalisieren",
            Label::Encourage => "Ermutigen oder bestärken; Motivation, Zuversicht oder Selbstwirksamkeit fördern",
            Label::Explain => "Erklären oder informieren; sachliche Zusammenhänge oder Hintergründe erläutern",
            Label::Advise => "Raten; Strategien, Empfehlungen oder Optionen vorschlagen",
            Label::Cooperate => "Gemeinsam planen oder kooperieren; explizites gemeinsames Vorgehen anbieten",
            Label::Warn => "Warnen; Risiken, Druck oder mögliche negative Konsequenzen betonen",
            Label::Ignore => "Ignorieren; auf die geäußerte Sorge nicht eingehen oder am Thema vorbeireden",
            Label::Denigrate => "Abwerten; beschämen, herabsetzen oder die Person negativ beurteilen",
        }
    }
    
    /// Look up a label by its exact key
    pub fn from_key(key: &str) -> Option<Label> {
        LABELS.iter().copied().find(|label| label.key() == key)
    }
}

impl FromStr for Label {
    type Err = LabelError;
    
    /// Surrounding whitespace is trimmed; matching is case-sensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Label::from_key(s.trim()).ok_or_else(|| LabelError::InvalidLabel(s.to_string()))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_keys_are_unique_and_ordered() {
        let keys: Vec<_> = LABELS.iter().map(|l| l.key()).collect();
        assert_eq!(keys[0], "help");
        assert_eq!(keys[9], "denigrate");
        
        let mut deduped = keys.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), 10);
    }
    
    #[test]
    fn test_parse_label() {
        assert_eq!("help".parse::<Label>().unwrap(), Label::Help);
        assert_eq!("  warn ".parse::<Label>().unwrap(), Label::Warn);
        assert!(matches!("Help".parse::<Label>(), Err(LabelError::InvalidLabel(_))));
        assert!(matches!("bogus".parse::<Label>(), Err(LabelError::InvalidLabel(_))));
        assert!("".parse::<Label>().is_err());
    }
}
