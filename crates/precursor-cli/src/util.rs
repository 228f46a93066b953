use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use precursor_core::{Discretizer, GraphConfig};
use precursor_search::SearchParams;

/// Destination of a JSON document: stdout or a file.
#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: io::Stdout,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = match output_path {
            Some(path) => Output::create(path)?,
            None => Output::Stdout {
                writer: io::stdout(),
            },
        };
        output.write_json(value)
    }

    fn create(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Output::Stdout { writer } => writer,
            Output::File { writer, .. } => writer,
        }
    }

    fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let name = self.display_path();
        let writer = self.writer();
        serde_json::to_writer_pretty(&mut *writer, value)
            .with_context(|| format!("Failed to write JSON to {name}"))?;
        writeln!(writer).with_context(|| format!("Failed to write newline after JSON to {name}"))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush output to {name}"))?;
        Ok(())
    }
}

/// Directory receiving the documents of one discovery run.
#[derive(Debug)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    pub fn create(root: &Path) -> anyhow::Result<Self> {
        fs::create_dir_all(root)
            .with_context(|| format!("Failed to create output directory: {}", root.display()))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Writes `value` as `<root>/<file_name>` and returns the written path.
    pub fn save_json<T>(&self, file_name: &str, value: &T) -> anyhow::Result<PathBuf>
    where
        T: serde::Serialize,
    {
        let path = self.root.join(file_name);
        Output::save_json(value, Some(path.clone()))?;
        Ok(path)
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Reads and validates a graph configuration file.
pub fn read_graph_config(path: &Path) -> anyhow::Result<Discretizer> {
    let config: GraphConfig = read_json_file("graph config", path)?;
    config
        .validate()
        .with_context(|| format!("Invalid graph config: {}", path.display()))
}

/// Reads and validates search parameters, falling back to the defaults when no file is given.
pub fn read_search_params(path: Option<&Path>) -> anyhow::Result<SearchParams> {
    let Some(path) = path else {
        return Ok(SearchParams::default());
    };
    let params: SearchParams = read_json_file("search params", path)?;
    params
        .validate()
        .with_context(|| format!("Invalid search params: {}", path.display()))?;
    Ok(params)
}
