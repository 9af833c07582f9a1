use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::{data::Direction, engine::Command};

/// A prerecorded run: one character per command, `#` starts a comment line.
pub struct ScriptedInput {
    script_commands: Vec<Command>,
    current_command_index: usize,
}

impl ScriptedInput {
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut script_commands = Vec::new();

        for line in reader.lines() {
            script_commands.extend(parse_line(&line?));
        }

        Ok(Self::new(script_commands))
    }

    pub fn parse(script: &str) -> Self {
        Self::new(script.lines().flat_map(parse_line).collect())
    }

    fn new(script_commands: Vec<Command>) -> Self {
        Self {
            script_commands,
            current_command_index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.script_commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.script_commands.is_empty()
    }

    pub fn next_command(&mut self) -> Option<Command> {
        let command = self.script_commands.get(self.current_command_index).copied()?;
        self.current_command_index += 1;
        Some(command)
    }
}

impl Iterator for ScriptedInput {
    type Item = Command;

    fn next(&mut self) -> Option<Command> {
        self.next_command()
    }
}

fn parse_line(line: &str) -> Vec<Command> {
    let trimmed_line = line.trim();
    if trimmed_line.starts_with('#') {
        return Vec::new();
    }
    trimmed_line
        .chars()
        .filter(|c| !c.is_whitespace())
        .filter_map(|c| {
            let command = char_to_command(c);
            if command.is_none() {
                tracing::warn!(key = %c, "unknown key in script");
            }
            command
        })
        .collect()
}

fn char_to_command(c: char) -> Option<Command> {
    match c.to_ascii_lowercase() {
        'w' | 'k' => Some(Command::Move(Direction::Up)),
        'a' | 'h' => Some(Command::Move(Direction::Left)),
        's' | 'j' => Some(Command::Move(Direction::Down)),
        'd' | 'l' => Some(Command::Move(Direction::Right)),
        '1' => Some(Command::Drop(0)),
        '2' => Some(Command::Drop(1)),
        '3' => Some(Command::Drop(2)),
        'z' => Some(Command::Use(0)),
        'x' => Some(Command::Use(1)),
        'c' => Some(Command::Use(2)),
        'i' => Some(Command::ListInventory),
        'p' => Some(Command::ListElements),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_moves_slots_and_listings() {
        let mut input = ScriptedInput::parse("# opening\nwasd\nKHJL 1z3c\n?ip\n");
        assert_eq!(input.len(), 14);
        let first = (0..4).filter_map(|_| input.next_command()).collect::<Vec<_>>();
        assert_eq!(
            first,
            vec![
                Command::Move(Direction::Up),
                Command::Move(Direction::Left),
                Command::Move(Direction::Down),
                Command::Move(Direction::Right),
            ]
        );
        let rest = input.collect::<Vec<_>>();
        assert_eq!(rest[4..], [
            Command::Drop(0),
            Command::Use(0),
            Command::Drop(2),
            Command::Use(2),
            Command::ListInventory,
            Command::ListElements,
        ]);
    }

    #[test]
    fn reads_scripts_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.txt");
        std::fs::write(&path, "# nothing but a comment\n\nddd\n").unwrap();
        let mut input = ScriptedInput::from_file(&path).unwrap();
        assert_eq!(input.len(), 3);
        assert_eq!(input.next_command(), Some(Command::Move(Direction::Right)));
        assert!(ScriptedInput::from_file(dir.path().join("missing.txt")).is_err());
    }
}
