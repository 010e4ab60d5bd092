use std::fmt;
use std::str::FromStr;

/// Collision energies that have a cross section table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Energy {
    Seven,
    Eight,
    #[default]
    Thirteen,
    Fourteen,
}

impl Energy {
    pub const ALL: [Energy; 4] = [
        Energy::Seven,
        Energy::Eight,
        Energy::Thirteen,
        Energy::Fourteen,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Energy::Seven => "7",
            Energy::Eight => "8",
            Energy::Thirteen => "13",
            Energy::Fourteen => "14",
        }
    }

    /// Collision energy in TeV.
    pub fn tev(self) -> u32 {
        match self {
            Energy::Seven => 7,
            Energy::Eight => 8,
            Energy::Thirteen => 13,
            Energy::Fourteen => 14,
        }
    }
}

impl fmt::Display for Energy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid energy: {0}")]
pub struct InvalidEnergy(pub String);

impl FromStr for Energy {
    type Err = InvalidEnergy;

    /// Only the exact table suffixes are accepted: no trimming, no leading zeros.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Energy::ALL
            .into_iter()
            .find(|energy| energy.as_str() == s)
            .ok_or_else(|| InvalidEnergy(s.to_string()))
    }
}

/// A cross section table, identified by energy and whether it is the history log.
///
/// Table names are only ever built from a validated [`Energy`], so they are safe
/// to interpolate into SQL.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Table {
    energy: Energy,
    history: bool,
}

impl Table {
    pub fn new(energy: Energy, history: bool) -> Self {
        Table { energy, history }
    }

    pub fn current(energy: Energy) -> Self {
        Table::new(energy, false)
    }

    pub fn energy(&self) -> Energy {
        self.energy
    }

    pub fn is_history(&self) -> bool {
        self.history
    }

    /// The history log that records every revision of this table's rows.
    pub fn history_log(&self) -> Table {
        Table::new(self.energy, true)
    }

    pub fn name(&self) -> String {
        table_name(self.energy, self.history)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

pub fn table_name(energy: Energy, history: bool) -> String {
    let mut table = format!("xs_{}TeV", energy.tev());
    if history {
        table.push_str("_history");
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_allowed_energies() {
        for (raw, energy) in [
            ("7", Energy::Seven),
            ("8", Energy::Eight),
            ("13", Energy::Thirteen),
            ("14", Energy::Fourteen),
        ] {
            assert_eq!(raw.parse::<Energy>(), Ok(energy));
            assert_eq!(energy.to_string(), raw);
        }
    }

    #[test]
    fn rejects_everything_else_verbatim() {
        for raw in ["", "0", "013", " 13", "13 ", "13.0", "6", "100", "thirteen"] {
            let err = raw.parse::<Energy>().unwrap_err();
            assert_eq!(err.to_string(), format!("Invalid energy: {raw}"));
        }
    }

    #[test]
    fn table_names() {
        assert_eq!(table_name(Energy::Seven, false), "xs_7TeV");
        assert_eq!(table_name(Energy::Eight, true), "xs_8TeV_history");
        assert_eq!(Table::current(Energy::Thirteen).name(), "xs_13TeV");
        assert_eq!(
            Table::current(Energy::Fourteen).history_log().to_string(),
            "xs_14TeV_history"
        );
    }

    #[test]
    fn table_name_is_deterministic() {
        for energy in Energy::ALL {
            for history in [false, true] {
                let name = Table::new(energy, history).name();
                assert_eq!(name, table_name(energy, history));
                assert!(name.starts_with(&format!("xs_{}TeV", energy.tev())));
                assert_eq!(name.ends_with("_history"), history);
            }
        }
    }
}
