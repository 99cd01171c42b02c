//! Beatmap template parsing and sample-block splicing

use crate::config::SAMPLE_MARKER;
use crate::error::{Error, Result};

/// Metadata fields needed to name the output beatmap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub artist: String,
    pub title: String,
    pub creator: String,
    pub version: String,
}

impl Metadata {
    /// `Artist - Title (Creator) [version].osu`, minus characters invalid in file names
    pub fn beatmap_file_name(&self, version: &str) -> String {
        let name = format!(
            "{} - {} ({}) [{}].osu",
            self.artist, self.title, self.creator, version
        );
        name.chars()
            .filter(|c| !matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
            .collect()
    }
}

/// A beatmap file kept line by line, with its original line endings
#[derive(Debug, Clone)]
pub struct Template {
    lines: Vec<String>,
    newline: &'static str,
    trailing_newline: bool,
    metadata: Metadata,
    marker: usize,
}

fn section_name(line: &str) -> Option<&str> {
    let line = line.trim();
    line.strip_prefix('[')?.strip_suffix(']')
}

fn metadata_field<'l>(line: &'l str, field: &str) -> Option<&'l str> {
    let (key, value) = line.split_once(':')?;
    (key.trim() == field).then(|| value.trim())
}

impl Template {
    /// Parse a template, requiring the metadata fields and the sample marker
    pub fn parse(text: &str) -> Result<Self> {
        let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
        let lines: Vec<String> = text
            .lines()
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();

        let mut artist = None;
        let mut title = None;
        let mut creator = None;
        let mut version = None;
        let mut marker = None;
        let mut section = "";

        for (index, line) in lines.iter().enumerate() {
            if let Some(name) = section_name(line) {
                section = name;
                continue;
            }
            if line.trim() == SAMPLE_MARKER && marker.is_none() {
                marker = Some(index);
                continue;
            }
            if section != "Metadata" {
                continue;
            }
            if let Some(v) = metadata_field(line, "Artist") {
                artist = Some(v.to_string());
            } else if let Some(v) = metadata_field(line, "Title") {
                title = Some(v.to_string());
            } else if let Some(v) = metadata_field(line, "Creator") {
                creator = Some(v.to_string());
            } else if let Some(v) = metadata_field(line, "Version") {
                version = Some(v.to_string());
            }
        }

        let missing = |field: &str| Error::Template(format!("missing metadata field '{}'", field));
        let metadata = Metadata {
            artist: artist.ok_or_else(|| missing("Artist"))?,
            title: title.ok_or_else(|| missing("Title"))?,
            creator: creator.ok_or_else(|| missing("Creator"))?,
            version: version.ok_or_else(|| missing("Version"))?,
        };
        let marker = marker
            .ok_or_else(|| Error::Template(format!("missing '{}' marker", SAMPLE_MARKER)))?;

        Ok(Self {
            lines,
            newline,
            trailing_newline: text.ends_with('\n'),
            metadata,
            marker,
        })
    }

    pub fn load(path: &std::path::Path) -> Result<Self> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Render the template with `version` and a fresh sample block
    ///
    /// `Sample,` lines directly after the marker are replaced by `samples`;
    /// everything else is copied unchanged apart from the `Version:` field.
    pub fn render(&self, version: &str, samples: &[String]) -> String {
        let mut out = String::new();
        let mut section = "";
        let mut index = 0;

        while index < self.lines.len() {
            let line = &self.lines[index];
            if let Some(name) = section_name(line) {
                section = name;
            }

            if section == "Metadata" && metadata_field(line, "Version").is_some() {
                out.push_str("Version:");
                out.push_str(version);
            } else {
                out.push_str(line);
            }
            out.push_str(self.newline);

            if index == self.marker {
                for sample in samples {
                    out.push_str(sample);
                    out.push_str(self.newline);
                }
                index += 1;
                while index < self.lines.len() && self.lines[index].starts_with("Sample,") {
                    index += 1;
                }
                continue;
            }
            index += 1;
        }

        if !self.trailing_newline && out.ends_with(self.newline) {
            out.truncate(out.len() - self.newline.len());
        }
        out
    }
}
