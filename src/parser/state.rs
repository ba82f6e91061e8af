//! Parser states and the context stack.

use smol_str::SmolStr;

/// What the parser is currently inside of, with the data that context needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum State {
    TopLevel,
    /// Plain enum body, read in one go by the enum sub-parser.
    Enum { key: SmolStr },
    EnumStruct { name: SmolStr, key: SmolStr },
    Methodmap { name: SmolStr, key: SmolStr },
    /// Function or method body.
    Function {
        name: SmolStr,
        key: SmolStr,
        /// Enum struct the function is a method of.
        enum_struct: Option<SmolStr>,
    },
    /// Getter/setter block of a methodmap property.
    Property { key: SmolStr },
    /// `typeset` / `funcenum` body.
    Typeset { key: SmolStr },
}

impl State {
    /// Table key of the item whose full range ends with this context.
    pub fn key(&self) -> Option<&SmolStr> {
        match self {
            State::TopLevel => None,
            State::Enum { key }
            | State::EnumStruct { key, .. }
            | State::Methodmap { key, .. }
            | State::Function { key, .. }
            | State::Property { key }
            | State::Typeset { key } => Some(key),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            State::TopLevel => "top-level",
            State::Enum { .. } => "enum",
            State::EnumStruct { .. } => "enum struct",
            State::Methodmap { .. } => "methodmap",
            State::Function { .. } => "function",
            State::Property { .. } => "property",
            State::Typeset { .. } => "typeset",
        }
    }
}

/// One entry of the context stack.
#[derive(Clone, Debug)]
pub struct Frame {
    pub state: State,
    /// Brace depth inside this context's block.
    pub depth: u32,
    /// Whether the opening brace has been seen yet.
    pub entered: bool,
}

/// Context stack with brace tracking.
///
/// A frame is pushed when a block header is recognised and popped when the
/// brace depth drops back below the depth of its block. The opening brace
/// may sit on a later line than the header.
#[derive(Clone, Debug)]
pub struct StateStack {
    frames: Vec<Frame>,
    depth: u32,
    paren_depth: u32,
}

impl Default for StateStack {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStack {
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            depth: 0,
            paren_depth: 0,
        }
    }

    pub fn current(&self) -> &State {
        self.frames.last().map_or(&State::TopLevel, |f| &f.state)
    }

    pub fn top(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Whether the cursor is directly inside the current context's block,
    /// not in a nested block of it.
    pub fn at_block_level(&self) -> bool {
        match self.frames.last() {
            None => self.depth == 0,
            Some(frame) => frame.entered && frame.depth == self.depth,
        }
    }

    /// Push a context whose block opens with the next `{`.
    pub fn push(&mut self, state: State) {
        tracing::trace!(state = state.name(), depth = self.depth + 1, "push");
        self.frames.push(Frame {
            state,
            depth: self.depth + 1,
            entered: false,
        });
    }

    /// Pop the current context regardless of braces.
    pub fn pop(&mut self) -> Option<State> {
        let frame = self.frames.pop()?;
        tracing::trace!(state = frame.state.name(), "pop");
        Some(frame.state)
    }

    /// Feed the masked text of one line. Returns the contexts closed on that
    /// line with the column just past their closing brace.
    ///
    /// Braces inside parentheses (default argument arrays) are ignored.
    pub fn feed_line(&mut self, masked: &str) -> Vec<(State, u32)> {
        let mut closed = Vec::new();
        for (col, b) in masked.bytes().enumerate() {
            match b {
                b'(' => self.paren_depth += 1,
                b')' => self.paren_depth = self.paren_depth.saturating_sub(1),
                b';' => self.paren_depth = self.paren_depth.saturating_sub(1),
                b'{' if self.paren_depth == 0 => {
                    self.depth += 1;
                    let depth = self.depth;
                    if let Some(frame) = self.frames.last_mut() {
                        if !frame.entered && frame.depth == depth {
                            frame.entered = true;
                        }
                    }
                }
                b'}' if self.paren_depth == 0 => {
                    self.depth = self.depth.saturating_sub(1);
                    while let Some(frame) = self.frames.last() {
                        if frame.entered && self.depth < frame.depth {
                            if let Some(state) = self.pop() {
                                closed.push((state, col as u32 + 1));
                            }
                        } else {
                            break;
                        }
                    }
                }
                _ => {}
            }
        }
        closed
    }

    /// Close every remaining context, innermost first.
    pub fn drain(&mut self) -> Vec<State> {
        let mut states = Vec::with_capacity(self.frames.len());
        while let Some(state) = self.pop() {
            states.push(state);
        }
        states
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
