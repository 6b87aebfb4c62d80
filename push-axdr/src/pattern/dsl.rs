//! Compiler for the textual pattern DSL
//!
//! Grammar: comma-separated atoms, whitespace-insensitive, with one
//! nesting form `S(...)` that may recurse. Atom vocabulary:
//!
//! | Atom | Meaning |
//! |------|---------|
//! | `F`  | must be the first element of the enclosing sequence |
//! | `C`  | untagged class id (big-endian u16 payload) |
//! | `TC` | tagged class id (UINT16 tag + payload) |
//! | `O`  | untagged OBIS (6 raw bytes) |
//! | `TO` | tagged OBIS (OCTET_STRING tag + length 6 + 6 bytes) |
//! | `A`  | untagged attribute id (1 byte) |
//! | `TA` | tagged attribute id (INT8/UINT8 tag + 1 byte) |
//! | `TV` | tagged value of any non-container type |
//! | `TVOSDTM` | tagged 12-byte OCTET_STRING reported as DATETIME |
//! | `TS` | tagged scaler (INT8 tag + 1 byte) |
//! | `TU` | tagged unit (ENUM tag + 1 byte) |
//! | `TSU` | structure of 2 holding TS then TU |
//! | `S(...)` | structure whose element count equals the inner atom count |
//!
//! Examples: `"TC,TO,TA,TV"`, `"TO,TV,TSU"`, `"F,C,O,A,TV"`.
//!
//! Unknown atoms are a hard compile error rather than being skipped, so
//! a typo cannot silently weaken a pattern.

use crate::pattern::{Pattern, Step, ValueRule};
use push_core::datatypes::DATE_TIME_LENGTH;
use push_core::{DataTag, PushError, PushResult};

impl Pattern {
    /// Compile a DSL string into a pattern
    pub fn from_dsl(name: &str, dsl: &str, priority: i32) -> PushResult<Self> {
        let atoms = split_atoms(dsl)?;
        let steps = compile_atoms(&atoms)?;
        if steps.is_empty() {
            return Err(PushError::PatternSyntax(format!(
                "Pattern '{}' compiles to no steps",
                name
            )));
        }
        Ok(Pattern {
            name: name.to_string(),
            priority,
            steps,
            default_class_id: 0,
        })
    }
}

/// Split on top-level commas, leaving `S(...)` groups intact
fn split_atoms(text: &str) -> PushResult<Vec<String>> {
    let mut atoms = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;

    for c in text.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(PushError::PatternSyntax(
                        "Unbalanced ')' in pattern".to_string(),
                    ));
                }
                current.push(c);
            }
            ',' if depth == 0 => {
                atoms.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if depth != 0 {
        return Err(PushError::PatternSyntax(
            "Unbalanced '(' in pattern".to_string(),
        ));
    }
    if !current.trim().is_empty() {
        atoms.push(current.trim().to_string());
    }

    Ok(atoms)
}

fn compile_atoms(atoms: &[String]) -> PushResult<Vec<Step>> {
    let mut steps = Vec::new();

    for atom in atoms {
        match atom.as_str() {
            "" => {}
            "F" => steps.push(Step::First),
            "C" => steps.push(Step::ClassId),
            "TC" => {
                steps.push(Step::ExactTag {
                    tag: DataTag::Uint16,
                    put_back: false,
                });
                steps.push(Step::ClassId);
            }
            "O" => steps.push(Step::ObisUntagged),
            "TO" => steps.push(Step::ObisTagged),
            "A" => steps.push(Step::AttributeId),
            "TA" => {
                steps.push(Step::AnyInt8Tag);
                steps.push(Step::AttributeId);
            }
            "TS" => steps.push(Step::Scaler),
            "TU" => steps.push(Step::Unit),
            "TV" => steps.push(Step::Value(ValueRule::default())),
            "TVOSDTM" => steps.push(Step::Value(ValueRule {
                expect_tag: Some(DataTag::OctetString),
                expect_len: Some(DATE_TIME_LENGTH as u8),
                reinterpret: Some(DataTag::DateTime),
            })),
            "TSU" => steps.push(Step::Structure {
                count: 2,
                children: vec![Step::Scaler, Step::Unit],
            }),
            group if group.starts_with('S') && group.contains('(') => {
                steps.push(compile_group(group)?);
            }
            unknown => {
                return Err(PushError::PatternSyntax(format!(
                    "Unknown pattern atom '{}'",
                    unknown
                )));
            }
        }
    }

    Ok(steps)
}

/// Compile an `S(inner,atoms,...)` group into a structure step
fn compile_group(group: &str) -> PushResult<Step> {
    let open = group.find('(');
    let close = group.rfind(')');
    let inner = match (open, close) {
        (Some(l), Some(r)) if r > l => &group[l + 1..r],
        _ => {
            return Err(PushError::PatternSyntax(format!(
                "Malformed structure group '{}'",
                group
            )));
        }
    };

    let inner_atoms: Vec<String> = split_atoms(inner)?
        .into_iter()
        .filter(|a| !a.is_empty())
        .collect();
    if inner_atoms.is_empty() {
        return Err(PushError::PatternSyntax(format!(
            "Empty structure group '{}'",
            group
        )));
    }

    let children = compile_atoms(&inner_atoms)?;
    Ok(Step::Structure {
        count: inner_atoms.len() as u8,
        children,
    })
}
