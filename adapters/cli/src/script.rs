//! Line-oriented edit scripts standing in for interactive input.

use std::str::FromStr;

use thiserror::Error;
use tile_defence_core::CellCoord;

/// Single instruction parsed from a script line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum ScriptStep {
    ToggleDestination(CellCoord),
    ToggleWall(CellCoord),
    ToggleSpawnPoint(CellCoord),
    /// Toggle a destination under a ground-plane point.
    Pick { x: f32, z: f32 },
    ShowPaths(bool),
    ShowGrid(bool),
    Run { ticks: u32 },
    Show,
}

/// Errors raised while parsing a script, tagged with a 1-based line number.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub(crate) enum ScriptError {
    #[error("line {line}: unknown instruction `{instruction}`")]
    UnknownInstruction { line: usize, instruction: String },
    #[error("line {line}: `{instruction}` expects {expected}")]
    WrongArity {
        line: usize,
        instruction: &'static str,
        expected: &'static str,
    },
    #[error("line {line}: `{value}` is not a valid {kind}")]
    InvalidValue {
        line: usize,
        value: String,
        kind: &'static str,
    },
}

/// Parses a whole script. Blank lines and `#` comments are skipped.
pub(crate) fn parse_script(source: &str) -> Result<Vec<ScriptStep>, ScriptError> {
    let mut steps = Vec::new();
    for (offset, raw) in source.lines().enumerate() {
        let line = offset + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }
        steps.push(parse_line(line, content)?);
    }
    Ok(steps)
}

fn parse_line(line: usize, content: &str) -> Result<ScriptStep, ScriptError> {
    let words: Vec<&str> = content.split_whitespace().collect();
    let Some((instruction, arguments)) = words.split_first() else {
        return Err(ScriptError::UnknownInstruction {
            line,
            instruction: content.to_owned(),
        });
    };

    match *instruction {
        "destination" => Ok(ScriptStep::ToggleDestination(cell(
            line,
            "destination",
            arguments,
        )?)),
        "wall" => Ok(ScriptStep::ToggleWall(cell(line, "wall", arguments)?)),
        "spawn" => Ok(ScriptStep::ToggleSpawnPoint(cell(line, "spawn", arguments)?)),
        "pick" => {
            let [x, z] = arguments else {
                return Err(arity(line, "pick", "two numbers"));
            };
            Ok(ScriptStep::Pick {
                x: number(line, x, "number")?,
                z: number(line, z, "number")?,
            })
        }
        "paths" => Ok(ScriptStep::ShowPaths(switch(line, "paths", arguments)?)),
        "grid" => Ok(ScriptStep::ShowGrid(switch(line, "grid", arguments)?)),
        "tick" => {
            let [count] = arguments else {
                return Err(arity(line, "tick", "a tick count"));
            };
            Ok(ScriptStep::Run {
                ticks: number(line, count, "tick count")?,
            })
        }
        "show" => {
            if arguments.is_empty() {
                Ok(ScriptStep::Show)
            } else {
                Err(arity(line, "show", "no arguments"))
            }
        }
        other => Err(ScriptError::UnknownInstruction {
            line,
            instruction: other.to_owned(),
        }),
    }
}

fn cell(
    line: usize,
    instruction: &'static str,
    arguments: &[&str],
) -> Result<CellCoord, ScriptError> {
    let [column, row] = arguments else {
        return Err(arity(line, instruction, "a column and a row"));
    };
    Ok(CellCoord::new(
        number(line, column, "column")?,
        number(line, row, "row")?,
    ))
}

fn switch(
    line: usize,
    instruction: &'static str,
    arguments: &[&str],
) -> Result<bool, ScriptError> {
    match arguments {
        ["on"] => Ok(true),
        ["off"] => Ok(false),
        [value] => Err(ScriptError::InvalidValue {
            line,
            value: (*value).to_owned(),
            kind: "switch (expected `on` or `off`)",
        }),
        _ => Err(arity(line, instruction, "`on` or `off`")),
    }
}

fn number<T: FromStr>(line: usize, value: &str, kind: &'static str) -> Result<T, ScriptError> {
    value.parse().map_err(|_| ScriptError::InvalidValue {
        line,
        value: value.to_owned(),
        kind,
    })
}

fn arity(line: usize, instruction: &'static str, expected: &'static str) -> ScriptError {
    ScriptError::WrongArity {
        line,
        instruction,
        expected,
    }
}
