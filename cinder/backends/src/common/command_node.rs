use std::rc::Rc;

use super::MinecraftCommand;

/// A node of an emitted function body
///
/// Nodes are plain values and are composed bottom-up into [`CommandNode::Block`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandNode {
    Command(MinecraftCommand),
    /// A command containing `$(name)` placeholders, rendered with a leading `$`
    Macro(MinecraftCommand),
    Block(Vec<CommandNode>),
    Comment(Rc<str>),
    LineBreak,
}

impl CommandNode {
    pub fn comment(text: impl Into<Rc<str>>) -> Self {
        CommandNode::Comment(text.into())
    }

    /// Whether this node renders any executable line
    pub fn has_commands(&self) -> bool {
        match self {
            CommandNode::Command(_) | CommandNode::Macro(_) => true,
            CommandNode::Block(nodes) => nodes.iter().any(CommandNode::has_commands),
            CommandNode::Comment(_) | CommandNode::LineBreak => false,
        }
    }

    /// Whether this node must be called with a macro compound
    pub fn has_macros(&self) -> bool {
        match self {
            CommandNode::Macro(_) => true,
            CommandNode::Block(nodes) => nodes.iter().any(CommandNode::has_macros),
            CommandNode::Command(_) | CommandNode::Comment(_) | CommandNode::LineBreak => false,
        }
    }

    /// Visits every command in render order
    pub fn for_each_command<'a>(&'a self, visit: &mut impl FnMut(&'a MinecraftCommand)) {
        match self {
            CommandNode::Command(command) | CommandNode::Macro(command) => visit(command),
            CommandNode::Block(nodes) => {
                for node in nodes {
                    node.for_each_command(visit);
                }
            }
            CommandNode::Comment(_) | CommandNode::LineBreak => {}
        }
    }

    /// Appends the lines of this node to `out`, each terminated by a newline
    pub fn render_into(&self, out: &mut String) {
        match self {
            CommandNode::Command(command) => {
                out.push_str(&command.to_string());
                out.push('\n');
            }
            CommandNode::Macro(command) => {
                out.push('$');
                out.push_str(&command.to_string());
                out.push('\n');
            }
            CommandNode::Block(nodes) => {
                for node in nodes {
                    node.render_into(out);
                }
            }
            CommandNode::Comment(text) => {
                for line in text.lines() {
                    out.push_str("# ");
                    out.push_str(line);
                    out.push('\n');
                }
            }
            CommandNode::LineBreak => out.push('\n'),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }
}

impl From<MinecraftCommand> for CommandNode {
    fn from(command: MinecraftCommand) -> Self {
        CommandNode::Command(command)
    }
}
