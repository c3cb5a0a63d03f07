//! Transaction script parsing.
//!
//! The text format, one transaction per file:
//!
//! ```text
//! N <registerCount>      header: number of local registers
//! R <item> <reg>         store[item] -> local[reg]
//! W <reg> <item>         local[reg] -> store[item]
//! A <reg> <value>        local[reg] += value
//! S <reg> <value>        local[reg] -= value
//! M <reg> <value>        local[reg] *= value
//! C <dest> <src>         local[dest] = local[src]
//! O <dest> <src>         local[dest] += local[src]
//! P                      dump the store (operands ignored)
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Anything else that
//! does not fit the grammar is a [`Error::Parse`] naming the offending line;
//! scripts are rejected wholesale before scheduling ever starts, so an
//! illegal opcode can never surface mid-run.

use std::path::Path;

use lockstep_core::{Command, Error, ItemId, Result};

/// A parsed transaction script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    /// Number of local registers the transaction declares.
    pub registers: usize,
    /// The command queue, in file order.
    pub commands: Vec<Command>,
}

/// Parse a script from its text.
pub fn parse_script(src: &str) -> Result<Script> {
    let mut registers: Option<usize> = None;
    let mut commands = Vec::new();

    for (idx, raw) in src.lines().enumerate() {
        let line = idx + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        let mut tokens = text.split_whitespace();
        let op = tokens.next().unwrap_or_default();

        if registers.is_none() {
            if op != "N" {
                return Err(parse_err(line, "expected header 'N <registerCount>'"));
            }
            let count = number::<usize>(line, tokens.next(), "register count")?;
            if count == 0 {
                return Err(parse_err(line, "register count must be at least 1"));
            }
            end_of_line(line, tokens.next())?;
            registers = Some(count);
            continue;
        }

        let cmd = match op {
            "R" => {
                let item = number::<usize>(line, tokens.next(), "item")?;
                let dest = number::<usize>(line, tokens.next(), "register")?;
                Command::Read {
                    item: ItemId(item),
                    dest,
                }
            }
            "W" => {
                let src = number::<usize>(line, tokens.next(), "register")?;
                let item = number::<usize>(line, tokens.next(), "item")?;
                Command::Write {
                    src,
                    item: ItemId(item),
                }
            }
            "A" => {
                let reg = number::<usize>(line, tokens.next(), "register")?;
                let value = number::<i64>(line, tokens.next(), "value")?;
                Command::Add { reg, value }
            }
            "S" => {
                let reg = number::<usize>(line, tokens.next(), "register")?;
                let value = number::<i64>(line, tokens.next(), "value")?;
                Command::Sub { reg, value }
            }
            "M" => {
                let reg = number::<usize>(line, tokens.next(), "register")?;
                let value = number::<i64>(line, tokens.next(), "value")?;
                Command::Mult { reg, value }
            }
            "C" => {
                let dest = number::<usize>(line, tokens.next(), "register")?;
                let src = number::<usize>(line, tokens.next(), "register")?;
                Command::Copy { dest, src }
            }
            "O" => {
                let dest = number::<usize>(line, tokens.next(), "register")?;
                let src = number::<usize>(line, tokens.next(), "register")?;
                Command::Combine { dest, src }
            }
            // Operands after P are explicitly ignored.
            "P" => Command::Print,
            "N" => return Err(parse_err(line, "duplicate header")),
            other => return Err(parse_err(line, format!("unknown opcode '{other}'"))),
        };
        if !matches!(cmd, Command::Print) {
            end_of_line(line, tokens.next())?;
        }
        commands.push(cmd);
    }

    match registers {
        Some(registers) => Ok(Script {
            registers,
            commands,
        }),
        None => Err(parse_err(0, "empty script: missing 'N' header")),
    }
}

/// Load and parse a script file.
pub fn load_script(path: impl AsRef<Path>) -> Result<Script> {
    let src = std::fs::read_to_string(path)?;
    parse_script(&src)
}

fn parse_err(line: usize, reason: impl Into<String>) -> Error {
    Error::Parse {
        line,
        reason: reason.into(),
    }
}

fn number<T: std::str::FromStr>(line: usize, token: Option<&str>, what: &str) -> Result<T> {
    let token = token.ok_or_else(|| parse_err(line, format!("missing {what} operand")))?;
    token
        .parse()
        .map_err(|_| parse_err(line, format!("invalid {what} '{token}'")))
}

fn end_of_line(line: usize, token: Option<&str>) -> Result<()> {
    match token {
        None => Ok(()),
        Some(extra) => Err(parse_err(line, format!("unexpected operand '{extra}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_opcode() {
        let script = parse_script(
            "N 3\nR 0 1\nW 1 0\nA 0 5\nS 1 -2\nM 2 3\nC 0 1\nO 1 2\nP\n",
        )
        .unwrap();
        assert_eq!(script.registers, 3);
        assert_eq!(script.commands.len(), 8);
        assert_eq!(
            script.commands[0],
            Command::Read { item: ItemId(0), dest: 1 }
        );
        assert_eq!(
            script.commands[1],
            Command::Write { src: 1, item: ItemId(0) }
        );
        assert_eq!(script.commands[3], Command::Sub { reg: 1, value: -2 });
        assert_eq!(script.commands[7], Command::Print);
    }

    #[test]
    fn skips_blank_lines_and_comments() {
        let script = parse_script("# header\n\nN 1\n\n# work\nA 0 1\n").unwrap();
        assert_eq!(script.commands, vec![Command::Add { reg: 0, value: 1 }]);
    }

    #[test]
    fn print_ignores_trailing_operands() {
        let script = parse_script("N 1\nP 0 0\n").unwrap();
        assert_eq!(script.commands, vec![Command::Print]);
    }

    #[test]
    fn missing_header_is_a_parse_error() {
        let err = parse_script("R 0 0\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn zero_registers_rejected() {
        let err = parse_script("N 0\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn unknown_opcode_names_the_line() {
        let err = parse_script("N 2\nA 0 1\nQ 1 2\n").unwrap_err();
        match err {
            Error::Parse { line, reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains('Q'));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn missing_operand_rejected() {
        let err = parse_script("N 2\nA 0\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }

    #[test]
    fn non_numeric_operand_rejected() {
        let err = parse_script("N 2\nA zero 1\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }

    #[test]
    fn extra_operand_rejected() {
        let err = parse_script("N 2\nA 0 1 2\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }

    #[test]
    fn empty_script_rejected() {
        assert!(parse_script("").is_err());
        assert!(parse_script("# only comments\n").is_err());
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t0.txn");
        std::fs::write(&path, "N 2\nR 0 0\nW 0 0\n").unwrap();
        let script = load_script(&path).unwrap();
        assert_eq!(script.registers, 2);
        assert_eq!(script.commands.len(), 2);
    }
}
