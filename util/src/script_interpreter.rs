//! # Script interpreter module
//!
//! Scripts are plain text files holding one timestamped entry per line:
//!
//! ```text
//! 0.0: {"buttons": [false, false, false, false, true, false, false, false], "axes": [0, 0, 0, 0, 0, 0, 0, 0]};
//! 2.5: null;
//! ```
//!
//! The payload after the colon is JSON, deserialised into the interpreter's
//! entry type. Simulated input devices use scripts to replay operator input.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An entry which is scripted to occur at a specific time.
#[derive(Debug)]
struct Entry<T> {
    /// The time the entry becomes due
    exec_time_s: f64,

    /// The payload of the entry
    payload: T,
}

/// A script interpreter.
///
/// After loading a script use [`ScriptInterpreter::get_pending`] to acquire
/// the entries that have become due.
#[derive(Debug)]
pub struct ScriptInterpreter<T> {
    script_path: PathBuf,
    entries: VecDeque<Entry<T>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)"
    )]
    InvalidTimestamp(String),

    #[error("Script contains an invalid entry at {0} s: {1}")]
    InvalidEntry(f64, serde_json::Error),

    #[error("Script entries must be in time order, {0} s comes after {1} s")]
    OutOfOrder(f64, f64),
}

/// Entries that are due at a given time.
#[derive(Debug, PartialEq)]
pub enum Pending<T> {
    None,
    Some(Vec<T>),
    EndOfScript,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T> ScriptInterpreter<T>
where
    T: DeserializeOwned,
{
    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let path = PathBuf::from(script_path.as_ref());

        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path));
        }

        let script = fs::read_to_string(&path).map_err(ScriptError::ScriptLoadError)?;

        let mut interp = Self::from_script(&script)?;
        interp.script_path = path;

        Ok(interp)
    }

    /// Create a new interpreter from the contents of a script.
    pub fn from_script(script: &str) -> Result<Self, ScriptError> {
        let mut entries: VecDeque<Entry<T>> = VecDeque::new();

        // Timestamp, colon, then everything up to the semicolon as payload
        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

        for cap in re.captures_iter(script) {
            let (time_str, payload_str) = match (cap.get(1), cap.get(3)) {
                (Some(t), Some(p)) => (t.as_str(), p.as_str()),
                _ => continue,
            };

            let exec_time_s: f64 = time_str
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            if let Some(last) = entries.back() {
                if exec_time_s < last.exec_time_s {
                    return Err(ScriptError::OutOfOrder(exec_time_s, last.exec_time_s));
                }
            }

            let payload = serde_json::from_str(payload_str)
                .map_err(|e| ScriptError::InvalidEntry(exec_time_s, e))?;

            entries.push_back(Entry {
                exec_time_s,
                payload,
            });
        }

        if entries.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(ScriptInterpreter {
            script_path: PathBuf::new(),
            entries,
        })
    }
}

impl<T> ScriptInterpreter<T> {
    /// Return the entries that are due at `current_time_s`, in script order.
    pub fn get_pending(&mut self, current_time_s: f64) -> Pending<T> {
        if self.entries.is_empty() {
            return Pending::EndOfScript;
        }

        let mut due = vec![];

        while let Some(front) = self.entries.front() {
            if front.exec_time_s > current_time_s {
                break;
            }
            if let Some(entry) = self.entries.pop_front() {
                due.push(entry.payload);
            }
        }

        if due.is_empty() {
            Pending::None
        } else {
            Pending::Some(due)
        }
    }

    /// Get the number of entries remaining in the script
    pub fn get_num_entries(&self) -> usize {
        self.entries.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.entries.back() {
            Some(c) => c.exec_time_s,
            None => 0f64,
        }
    }

    /// Path the script was loaded from, empty for scripts built from strings.
    pub fn script_path(&self) -> &Path {
        &self.script_path
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pending_entries() {
        let mut si: ScriptInterpreter<Option<f64>> =
            ScriptInterpreter::from_script("0.0: 1.0;\n0.5: null;\n 2: 3.5;\n").unwrap();

        assert_eq!(si.get_num_entries(), 3);
        assert_eq!(si.get_duration(), 2.0);

        assert_eq!(si.get_pending(0.1), Pending::Some(vec![Some(1.0)]));
        assert_eq!(si.get_pending(0.2), Pending::None);
        assert_eq!(si.get_pending(5.0), Pending::Some(vec![None, Some(3.5)]));
        assert_eq!(si.get_pending(6.0), Pending::EndOfScript);
    }

    #[test]
    fn test_bad_scripts() {
        match ScriptInterpreter::<f64>::from_script("# nothing here\n") {
            Err(ScriptError::ScriptEmpty) => (),
            r => panic!("Expected empty script error, got {:?}", r),
        }

        match ScriptInterpreter::<f64>::from_script("0.0: {oops};") {
            Err(ScriptError::InvalidEntry(t, _)) => assert_eq!(t, 0.0),
            r => panic!("Expected invalid entry error, got {:?}", r),
        }

        match ScriptInterpreter::<f64>::from_script("1.0: 1.0;\n0.5: 2.0;") {
            Err(ScriptError::OutOfOrder(a, b)) => assert_eq!((a, b), (0.5, 1.0)),
            r => panic!("Expected out of order error, got {:?}", r),
        }

        match ScriptInterpreter::<f64>::new("/no/such/script.prs") {
            Err(ScriptError::ScriptNotFound(_)) => (),
            r => panic!("Expected not found error, got {:?}", r),
        }
    }
}
