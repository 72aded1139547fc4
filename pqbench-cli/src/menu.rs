//! Family selection menu
//!
//! ```text
//! 0  all families
//! 1  ML-DSA
//! 2  XMSS
//! 3  SLH-DSA
//! ```

use pqbench_core::Family;
use std::io::{BufRead, Write};

use crate::HarnessError;

/// Which families a run sweeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Every family, in catalog order
    All,
    /// A single family
    Family(Family),
}

impl Selection {
    /// Parse one menu answer. Anything but `0`..`3` is rejected.
    pub fn from_menu_input(input: &str) -> Result<Self, HarnessError> {
        match input.trim() {
            "0" => Ok(Selection::All),
            "1" => Ok(Selection::Family(Family::MlDsa)),
            "2" => Ok(Selection::Family(Family::Xmss)),
            "3" => Ok(Selection::Family(Family::SlhDsa)),
            other => Err(HarnessError::InvalidSelection(other.to_string())),
        }
    }

    /// Families to sweep, in order
    pub fn families(self) -> Vec<Family> {
        match self {
            Selection::All => Family::ALL.to_vec(),
            Selection::Family(family) => vec![family],
        }
    }
}

/// Print the menu to `out` and read a single answer from `input`.
/// There is no second prompt on bad input.
pub fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<Selection, HarnessError> {
    writeln!(out, "¿Qué algoritmo quieres evaluar?")?;
    writeln!(out, "  0. Todos")?;
    for (i, family) in Family::ALL.iter().enumerate() {
        writeln!(out, "  {}. {}", i + 1, family)?;
    }
    write!(out, "> ")?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Selection::from_menu_input(&line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_menu_numbers() {
        assert_eq!(Selection::from_menu_input("0").unwrap(), Selection::All);
        assert_eq!(
            Selection::from_menu_input(" 3\n").unwrap(),
            Selection::Family(Family::SlhDsa)
        );
        assert_eq!(
            Selection::from_menu_input("2").unwrap().families(),
            vec![Family::Xmss]
        );
        assert_eq!(Selection::All.families().len(), 3);
    }

    #[test]
    fn test_invalid_input_is_rejected() {
        for bad in ["9", "-1", "uno", "", "1 2"] {
            let err = Selection::from_menu_input(bad).unwrap_err();
            assert!(matches!(err, HarnessError::InvalidSelection(_)), "{bad}");
        }
    }

    #[test]
    fn test_invalid_selection_message() {
        let err = Selection::from_menu_input("9").unwrap_err();
        assert_eq!(err.to_string(), "Introduce únicamente el número [0,1,2,3].");
    }

    #[test]
    fn test_prompt_reads_one_line() {
        let mut input = Cursor::new("1\n9\n");
        let mut out = Vec::new();
        let selection = prompt(&mut input, &mut out).unwrap();
        assert_eq!(selection, Selection::Family(Family::MlDsa));

        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("0. Todos"));
        assert!(shown.contains("3. SLH-DSA"));
    }

    #[test]
    fn test_prompt_on_closed_stdin_is_invalid() {
        let mut input = Cursor::new("");
        let mut out = Vec::new();
        assert!(matches!(
            prompt(&mut input, &mut out),
            Err(HarnessError::InvalidSelection(_))
        ));
    }
}
