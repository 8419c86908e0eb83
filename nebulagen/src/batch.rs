use std::path::{Path, PathBuf};

/// The directory an output unit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputGroup {
    Vertices,
    Edges,
    /// The output root, home of the consolidated schema document.
    Root,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Ngql,
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Ngql => "ngql",
            OutputFormat::Csv => "csv",
        }
    }
}

/// Destination of one emission batch, named `<source-system>.<kind>[.qualifier]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputUnit {
    pub group: OutputGroup,
    pub name: String,
    pub format: OutputFormat,
}

impl OutputUnit {
    pub fn vertices(name: impl Into<String>) -> Self {
        Self::new(OutputGroup::Vertices, name, OutputFormat::Ngql)
    }

    pub fn edges(name: impl Into<String>) -> Self {
        Self::new(OutputGroup::Edges, name, OutputFormat::Ngql)
    }

    pub fn schema() -> Self {
        Self::new(OutputGroup::Root, "schema", OutputFormat::Ngql)
    }

    pub fn new(group: OutputGroup, name: impl Into<String>, format: OutputFormat) -> Self {
        Self {
            group,
            name: name.into(),
            format,
        }
    }

    /// Same unit rendered as a CSV twin.
    pub fn as_csv(&self) -> Self {
        Self {
            format: OutputFormat::Csv,
            ..self.clone()
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.format.extension())
    }

    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchContent {
    /// nGQL statements, declarations first.
    Statements(Vec<String>),
    /// Tabular export: header row, then one row per record.
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

/// An ordered group of rendered output destined for one [`OutputUnit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissionBatch {
    pub unit: OutputUnit,
    pub content: BatchContent,
}

impl EmissionBatch {
    pub fn statements(unit: OutputUnit, declarations: impl IntoIterator<Item = String>) -> Self {
        Self {
            unit,
            content: BatchContent::Statements(declarations.into_iter().collect()),
        }
    }

    pub fn table(unit: OutputUnit, header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            unit,
            content: BatchContent::Table { header, rows },
        }
    }

    pub fn push_statement(&mut self, statement: String) {
        if let BatchContent::Statements(statements) = &mut self.content {
            statements.push(statement);
        }
    }

    /// Statements of an nGQL batch; empty for tables.
    pub fn lines(&self) -> &[String] {
        match &self.content {
            BatchContent::Statements(statements) => statements,
            BatchContent::Table { .. } => &[],
        }
    }

    /// Number of `INSERT` statements (nGQL) or data rows (CSV).
    pub fn data_count(&self) -> usize {
        match &self.content {
            BatchContent::Statements(statements) => statements
                .iter()
                .filter(|stmt| stmt.starts_with("INSERT "))
                .count(),
            BatchContent::Table { rows, .. } => rows.len(),
        }
    }
}
