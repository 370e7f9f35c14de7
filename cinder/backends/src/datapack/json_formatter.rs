use std::fmt::Write;

use crate::common::{string_escape::escape_minecraft, DataPath, DataTarget, ScoreboardPlayer};

/// One part of a printed message
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum JsonFormatComponent {
    RawText(String),
    Score(ScoreboardPlayer),
    Nbt(DataPath),
}

pub(crate) fn format_json(components: &[JsonFormatComponent]) -> String {
    let mut buf = JsonTextWriter::default();

    for component in components {
        buf.write(component);
    }

    buf.into_string()
}

/// Writes a json text component array, merging adjacent text parts
#[derive(Debug)]
pub(crate) struct JsonTextWriter {
    buf: String,
    pending: String,
}

impl JsonTextWriter {
    pub fn write(&mut self, component: &JsonFormatComponent) {
        match component {
            JsonFormatComponent::RawText(text) => self.write_str(text),
            JsonFormatComponent::Score(player) => self.write_score(player),
            JsonFormatComponent::Nbt(path) => self.write_nbt(path),
        }
    }

    pub fn into_string(mut self) -> String {
        // Removes the trailing comma...
        self.flush_pending();
        if self.buf.ends_with(',') {
            self.buf.pop();
        }
        self.buf.push(']');
        self.buf
    }

    fn flush_pending(&mut self) {
        if !self.pending.is_empty() {
            let pending = self.pending.as_str();
            let _ = write!(self.buf, r#"{{"text":"{pending}"}},"#);
            self.pending.clear();
        }
    }

    fn write_str(&mut self, value: &str) {
        self.pending.extend(escape_minecraft(value));
    }

    fn write_score(&mut self, ScoreboardPlayer { player, scoreboard }: &ScoreboardPlayer) {
        self.flush_pending();
        let player: String = escape_minecraft(player).collect();
        let _ = write!(
            self.buf,
            r#"{{"score":{{"name":"{player}","objective":"{scoreboard}"}}}},"#
        );
    }

    fn write_nbt(&mut self, DataPath { target, path }: &DataPath) {
        self.flush_pending();
        let path: String = escape_minecraft(path).collect();
        let (kind, source) = match target {
            DataTarget::Storage(id) => ("storage", id),
            DataTarget::Entity(selector) => ("entity", selector),
            DataTarget::Block(position) => ("block", position),
        };
        let _ = write!(self.buf, r#"{{"nbt":"{path}","{kind}":"{source}"}},"#);
    }
}

impl Default for JsonTextWriter {
    fn default() -> Self {
        let mut writer = JsonTextWriter {
            buf: String::default(),
            pending: String::default(),
        };
        writer.buf.push('[');
        writer
    }
}

#[cfg(test)]
mod tests {
    use crate::common::{DataPath, DataTarget, ScoreboardPlayer};

    use super::{format_json, JsonFormatComponent};

    #[test]
    fn test_formatter() {
        assert_eq!(
            format_json(&[JsonFormatComponent::RawText("Hello World!".into())]),
            r#"[{"text":"Hello World!"}]"#
        );
    }

    #[test]
    fn test_newlines() {
        assert_eq!(
            format_json(&[JsonFormatComponent::RawText("This\nhas\n\"many\"\nlines".into())]),
            r#"[{"text":"This\nhas\n\"many\"\nlines"}]"#
        );
    }

    #[test]
    fn test_formatter_empty() {
        assert_eq!(format_json(&[]), r"[]");
    }

    #[test]
    fn test_formatter_multiple_args() {
        assert_eq!(
            format_json(&[
                JsonFormatComponent::RawText("Hello World!".into()),
                JsonFormatComponent::RawText(" The score is: ".into()),
                JsonFormatComponent::Score(ScoreboardPlayer {
                    player: "demo/main.x".into(),
                    scoreboard: "cinder".into(),
                }),
                JsonFormatComponent::Nbt(DataPath {
                    target: DataTarget::Storage("demo:vars".into()),
                    path: "demo/main.s".into(),
                }),
            ]),
            r#"[{"text":"Hello World! The score is: "},{"score":{"name":"demo/main.x","objective":"cinder"}},{"nbt":"demo/main.s","storage":"demo:vars"}]"#
        );
    }
}
