//! Per-package dependency lists and their emission

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dependency field a string is emitted into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Depends,
    Recommends,
    Suggests,
    Enhances,
    Breaks,
}

impl Category {
    /// Returns the Debian field name
    pub fn field_name(&self) -> &'static str {
        match self {
            Category::Depends => "Depends",
            Category::Recommends => "Recommends",
            Category::Suggests => "Suggests",
            Category::Enhances => "Enhances",
            Category::Breaks => "Breaks",
        }
    }

    /// Returns all categories in emission order
    pub fn all() -> &'static [Category] {
        &[
            Category::Depends,
            Category::Recommends,
            Category::Suggests,
            Category::Enhances,
            Category::Breaks,
        ]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

/// Post-install bytecode maintenance step for a private directory
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuntimeUpdate {
    pub location: String,
    pub args: String,
}

impl RuntimeUpdate {
    pub fn new(location: impl Into<String>, args: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            args: args.into(),
        }
    }
}

/// Receiver of emitted dependency strings and runtime-update descriptors
pub trait SubstvarSink {
    /// Receive one dependency string for a package field
    fn add_substvar(&mut self, package: &str, category: Category, value: &str);

    /// Receive one runtime-update descriptor
    fn add_rtupdate(&mut self, package: &str, update: &RuntimeUpdate);
}

/// Dependency relations collected for one binary package
///
/// Each list keeps insertion order and ignores repeated literal strings.
/// [`DependencySet::emit`] consumes the set, so a set is emitted at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencySet {
    pub package: String,
    pub depends: Vec<String>,
    pub recommends: Vec<String>,
    pub suggests: Vec<String>,
    pub enhances: Vec<String>,
    pub breaks: Vec<String>,
    pub rtupdates: Vec<RuntimeUpdate>,
}

impl DependencySet {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            ..Self::default()
        }
    }

    /// Returns the list for a category
    pub fn entries(&self, category: Category) -> &[String] {
        match category {
            Category::Depends => &self.depends,
            Category::Recommends => &self.recommends,
            Category::Suggests => &self.suggests,
            Category::Enhances => &self.enhances,
            Category::Breaks => &self.breaks,
        }
    }

    fn entries_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Depends => &mut self.depends,
            Category::Recommends => &mut self.recommends,
            Category::Suggests => &mut self.suggests,
            Category::Enhances => &mut self.enhances,
            Category::Breaks => &mut self.breaks,
        }
    }

    /// Adds a value unless it is empty or already present
    pub fn add(&mut self, category: Category, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        let entries = self.entries_mut(category);
        if !entries.contains(&value) {
            entries.push(value);
        }
    }

    pub fn depend(&mut self, value: impl Into<String>) {
        self.add(Category::Depends, value);
    }

    pub fn recommend(&mut self, value: impl Into<String>) {
        self.add(Category::Recommends, value);
    }

    pub fn suggest(&mut self, value: impl Into<String>) {
        self.add(Category::Suggests, value);
    }

    pub fn enhance(&mut self, value: impl Into<String>) {
        self.add(Category::Enhances, value);
    }

    pub fn break_(&mut self, value: impl Into<String>) {
        self.add(Category::Breaks, value);
    }

    pub fn rtupdate(&mut self, update: RuntimeUpdate) {
        if !self.rtupdates.contains(&update) {
            self.rtupdates.push(update);
        }
    }

    pub fn is_empty(&self) -> bool {
        Category::all().iter().all(|c| self.entries(*c).is_empty()) && self.rtupdates.is_empty()
    }

    /// Hands every entry to the sink, category by category, in insertion order
    pub fn emit(self, sink: &mut dyn SubstvarSink) {
        for category in Category::all() {
            for value in self.entries(*category) {
                sink.add_substvar(&self.package, *category, value);
            }
        }
        for update in &self.rtupdates {
            sink.add_rtupdate(&self.package, update);
        }
    }
}

impl fmt::Display for DependencySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "D={:?}; R={:?}; S={:?}; E={:?}; B={:?}; RT={:?}",
            self.depends, self.recommends, self.suggests, self.enhances, self.breaks, self.rtupdates
        )
    }
}

/// Sink that records everything it receives, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySink {
    pub substvars: Vec<(String, Category, String)>,
    pub rtupdates: Vec<(String, RuntimeUpdate)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the values received for one package field
    pub fn values(&self, package: &str, category: Category) -> Vec<&str> {
        self.substvars
            .iter()
            .filter(|(p, c, _)| p == package && *c == category)
            .map(|(_, _, v)| v.as_str())
            .collect()
    }
}

impl SubstvarSink for MemorySink {
    fn add_substvar(&mut self, package: &str, category: Category, value: &str) {
        self.substvars
            .push((package.to_string(), category, value.to_string()));
    }

    fn add_rtupdate(&mut self, package: &str, update: &RuntimeUpdate) {
        self.rtupdates.push((package.to_string(), update.clone()));
    }
}
