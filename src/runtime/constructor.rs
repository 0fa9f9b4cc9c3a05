use std::fmt;

use crate::runtime::{error::RuntimeError, value::Value};

/// Runtime instance of an algebraic-data-type alternative.
///
/// Fields are reserved by `new_constructor` and filled by the caller before
/// the value is shared. Each filled field holds one reference owned by the
/// constructor.
#[derive(Debug)]
pub struct Constructor {
    tag: i32,
    name: Option<Box<str>>,
    fields: Box<[Option<Value>]>,
}

impl Constructor {
    pub(crate) fn new(total: usize, tag: i32, name: Option<&str>) -> Self {
        Self {
            tag,
            name: name.map(Box::from),
            fields: (0..total).map(|_| None).collect(),
        }
    }

    pub fn tag(&self) -> i32 {
        self.tag
    }

    /// Display name, kept for diagnostics only.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// Field `index`, or `None` when out of range or never filled.
    pub fn field(&self, index: usize) -> Option<&Value> {
        let field = self.fields.get(index)?.as_ref();
        debug_assert!(field.is_some(), "constructor field {index} read before it was filled");
        field
    }

    pub fn fields(&self) -> impl Iterator<Item = Option<&Value>> {
        self.fields.iter().map(Option::as_ref)
    }

    /// `true` once every field holds a value.
    pub fn is_complete(&self) -> bool {
        self.fields.iter().all(Option::is_some)
    }

    pub(crate) fn fill(&mut self, index: usize, value: Value) -> Result<(), RuntimeError> {
        let len = self.fields.len();
        let slot = self
            .fields
            .get_mut(index)
            .ok_or(RuntimeError::SlotOutOfBounds { index, len })?;
        *slot = Some(value);
        Ok(())
    }

    pub(crate) fn drain_into(&mut self, out: &mut Vec<Value>) {
        out.extend(self.fields.iter_mut().filter_map(Option::take));
    }
}

impl fmt::Display for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}", name)?,
            None => write!(f, "#{}", self.tag)?,
        }
        if self.fields.is_empty() {
            return Ok(());
        }
        let items: Vec<String> = self
            .fields
            .iter()
            .map(|field| match field {
                Some(value) => value.to_string(),
                None => "_".to_string(),
            })
            .collect();
        write!(f, "({})", items.join(", "))
    }
}
