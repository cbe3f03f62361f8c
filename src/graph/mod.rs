//! Filter-graph assembly.
//!
//! A [`CompositionGraph`] is an ordered list of statements, each one filter
//! chain with explicit input and output labels. Labels follow single
//! assignment: every label is produced once, consumed once, and only after
//! it was produced. The one label left unconsumed is the terminal `v`.

mod compose;
mod labels;

pub use compose::{
    compose, cover_position, BackgroundSource, GraphInputs, InputLayout, BASE_BACKGROUND_LABEL,
    COVER_LABEL, FINAL_BACKGROUND_LABEL, TERMINAL_LABEL,
};
pub use labels::{scan_labels, LabelUse};

use std::collections::HashMap;
use std::fmt;

/// Errors found when checking a graph's label discipline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("Unterminated {0} in filter graph")]
    Unterminated(&'static str),
    #[error("Label [{0}] is consumed before it is produced")]
    Undefined(String),
    #[error("Label [{0}] is produced more than once")]
    Redefined(String),
    #[error("Label [{0}] is consumed more than once")]
    ConsumedTwice(String),
    #[error("Label [{0}] is produced but never consumed")]
    Dangling(String),
    #[error("Graph does not end in [{0}]")]
    MissingTerminal(&'static str),
    #[error("Input stream {index} is referenced but only {count} inputs are supplied")]
    InputOutOfRange { index: usize, count: usize },
}

/// Reference to a stream feeding a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamRef {
    /// Video stream of the `index`-th `-i` input.
    Input(usize),
    /// Output of an earlier statement.
    Label(String),
}

impl StreamRef {
    pub fn label(name: impl Into<String>) -> Self {
        Self::Label(name.into())
    }
}

impl fmt::Display for StreamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(index) => write!(f, "[{index}:v]"),
            Self::Label(name) => write!(f, "[{name}]"),
        }
    }
}

/// One chain: `[inputs]body[outputs]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub inputs: Vec<StreamRef>,
    pub body: String,
    pub outputs: Vec<String>,
}

impl Statement {
    pub fn new(inputs: Vec<StreamRef>, body: impl Into<String>, output: &str) -> Self {
        Self {
            inputs,
            body: body.into(),
            outputs: vec![output.to_string()],
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for input in &self.inputs {
            write!(f, "{input}")?;
        }
        f.write_str(&self.body)?;
        for output in &self.outputs {
            write!(f, "[{output}]")?;
        }
        Ok(())
    }
}

/// Ordered statements making up one `-filter_complex` graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositionGraph {
    statements: Vec<Statement>,
}

impl CompositionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Label of the graph's final output.
    pub fn terminal_label(&self) -> Option<&str> {
        self.statements
            .last()
            .and_then(|statement| statement.outputs.last())
            .map(String::as_str)
    }

    /// Input indices referenced anywhere in the graph, fragments included.
    pub fn referenced_inputs(&self) -> Result<Vec<usize>, GraphError> {
        let mut indices: Vec<usize> = scan_labels(&self.to_string())?
            .into_iter()
            .filter_map(|label| match label {
                LabelUse::Stream { index, .. } => Some(index),
                _ => None,
            })
            .collect();
        indices.sort_unstable();
        indices.dedup();
        Ok(indices)
    }

    /// Check single assignment over the serialized graph and that exactly
    /// [`TERMINAL_LABEL`] is left as the output.
    pub fn validate(&self) -> Result<(), GraphError> {
        // Label -> times consumed, in production order.
        let mut produced: Vec<(String, usize)> = Vec::new();
        let mut position: HashMap<String, usize> = HashMap::new();

        for label in scan_labels(&self.to_string())? {
            match label {
                LabelUse::Stream { .. } => {}
                LabelUse::Produced(name) => {
                    if position.contains_key(&name) {
                        return Err(GraphError::Redefined(name));
                    }
                    position.insert(name.clone(), produced.len());
                    produced.push((name, 0));
                }
                LabelUse::Consumed(name) => {
                    let Some(&index) = position.get(&name) else {
                        return Err(GraphError::Undefined(name));
                    };
                    let uses = &mut produced[index].1;
                    *uses += 1;
                    if *uses > 1 {
                        return Err(GraphError::ConsumedTwice(name));
                    }
                }
            }
        }

        let mut unconsumed = produced.into_iter().filter(|(_, uses)| *uses == 0);
        match unconsumed.next() {
            Some((name, _)) if name == TERMINAL_LABEL => {}
            Some((name, _)) => return Err(GraphError::Dangling(name)),
            None => return Err(GraphError::MissingTerminal(TERMINAL_LABEL)),
        }
        if let Some((name, _)) = unconsumed.next() {
            return Err(GraphError::Dangling(name));
        }
        Ok(())
    }

    /// [`validate`](Self::validate) plus a bound on referenced input indices.
    pub fn validate_inputs(&self, input_count: usize) -> Result<(), GraphError> {
        self.validate()?;
        match self.referenced_inputs()?.into_iter().find(|index| *index >= input_count) {
            Some(index) => Err(GraphError::InputOutOfRange {
                index,
                count: input_count,
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for CompositionGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, statement) in self.statements.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{statement}")?;
        }
        Ok(())
    }
}
