use crate::error::WheelError;

/// Names on the wheel, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantList {
    names: Vec<String>,
}

impl ParticipantList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a trimmed name to the end of the list and returns what was stored.
    pub fn add(&mut self, name: &str) -> Result<&str, WheelError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(WheelError::EmptyName);
        }
        if self.names.iter().any(|existing| existing == trimmed) {
            return Err(WheelError::DuplicateName(trimmed.to_string()));
        }
        self.names.push(trimmed.to_string());
        Ok(self.names[self.names.len() - 1].as_str())
    }

    pub fn remove(&mut self, index: usize) -> Result<String, WheelError> {
        if index >= self.names.len() {
            return Err(WheelError::NoSuchParticipant {
                index,
                len: self.names.len(),
            });
        }
        Ok(self.names.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
impl<S: AsRef<str>> FromIterator<S> for ParticipantList {
    /// Builds a fixture list, skipping blanks and repeats.
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = ParticipantList::new();
        for name in iter {
            let _ = list.add(name.as_ref());
        }
        list
    }
}
