use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four boolean input pairs in truth-table order.
pub const CANONICAL_INPUTS: [(f32, f32); 4] = [(0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (1.0, 1.0)];

/// A known-correct `(input, label)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoldenVector {
    pub input: (f32, f32),
    pub expected_label: u8,
}

impl GoldenVector {
    /// Builds a full truth table from labels given in [`CANONICAL_INPUTS`]
    /// order.
    pub fn truth_table(labels: [u8; 4]) -> [GoldenVector; 4] {
        let mut table = [GoldenVector { input: (0.0, 0.0), expected_label: 0 }; 4];
        for (slot, (input, expected_label)) in table.iter_mut().zip(CANONICAL_INPUTS.into_iter().zip(labels)) {
            *slot = GoldenVector { input, expected_label };
        }
        table
    }
}

static AND_MODEL: &[u8] = include_bytes!("../../models/and_gate.json");
static OR_MODEL: &[u8] = include_bytes!("../../models/or_gate.json");
static NOR_MODEL: &[u8] = include_bytes!("../../models/nor_gate.json");
static XOR_MODEL: &[u8] = include_bytes!("../../models/xor_gate.json");
static XNOR_MODEL: &[u8] = include_bytes!("../../models/xnor_gate.json");

/// The logic gates shipped as quantized models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    And,
    Or,
    Nor,
    Xor,
    Xnor,
}

impl Gate {
    pub const ALL: [Gate; 5] = [Gate::And, Gate::Nor, Gate::Or, Gate::Xnor, Gate::Xor];

    pub fn name(&self) -> &'static str {
        match self {
            Gate::And => "and",
            Gate::Or => "or",
            Gate::Nor => "nor",
            Gate::Xor => "xor",
            Gate::Xnor => "xnor",
        }
    }

    /// Expected labels in [`CANONICAL_INPUTS`] order.
    ///
    /// The `nor` table is low only when both inputs are high, and the
    /// bundled `nor` model is built to match it.
    pub fn labels(&self) -> [u8; 4] {
        match self {
            Gate::And => [0, 0, 0, 1],
            Gate::Or => [0, 1, 1, 1],
            Gate::Nor => [1, 1, 1, 0],
            Gate::Xor => [0, 1, 1, 0],
            Gate::Xnor => [1, 0, 0, 1],
        }
    }

    pub fn golden_vectors(&self) -> [GoldenVector; 4] {
        GoldenVector::truth_table(self.labels())
    }

    /// Serialized model for this gate, embedded at compile time.
    pub fn model_blob(&self) -> &'static [u8] {
        match self {
            Gate::And => AND_MODEL,
            Gate::Or => OR_MODEL,
            Gate::Nor => NOR_MODEL,
            Gate::Xor => XOR_MODEL,
            Gate::Xnor => XNOR_MODEL,
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Gate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gate::ALL
            .into_iter()
            .find(|g| g.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown gate '{s}' (expected and, or, nor, xor or xnor)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truth_tables_cover_domain_once_in_order() {
        for gate in Gate::ALL {
            let table = gate.golden_vectors();
            let inputs: Vec<_> = table.iter().map(|v| v.input).collect();
            assert_eq!(inputs, CANONICAL_INPUTS.to_vec());
            for v in &table {
                assert!(v.expected_label <= 1);
                assert!([0.0, 1.0].contains(&v.input.0) && [0.0, 1.0].contains(&v.input.1));
            }
        }
    }

    #[test]
    fn gate_names_round_trip_through_from_str() {
        for gate in Gate::ALL {
            assert_eq!(gate.name().parse::<Gate>().unwrap(), gate);
        }
        assert_eq!("XNOR".parse::<Gate>().unwrap(), Gate::Xnor);
        assert!("nand".parse::<Gate>().is_err());
    }

    #[test]
    fn xor_and_xnor_are_complements() {
        let xor = Gate::Xor.labels();
        let xnor = Gate::Xnor.labels();
        for i in 0..4 {
            assert_eq!(xor[i] ^ 1, xnor[i]);
        }
    }
}
