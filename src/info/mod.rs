//! Information file: species tree, species assignments and optional colours.
//!
//! ```text
//! [species tree]
//! (A,(B,C));
//! [species assignments]
//! A = gene1, gene2
//! B = gene3,
//!     gene4
//! [species colours]
//! A = #f00
//! B = 0,128,255
//! ```

use crate::clustering::SpeciesMap;
use crate::error::{MiphyError, Result};
use std::collections::{BTreeMap, BTreeSet};

pub const TREE_SECTION: &str = "species tree";
pub const ASSIGNMENT_SECTION: &str = "species assignments";
pub const COLOUR_SECTION: &str = "species colours";
pub const COLOR_SECTION: &str = "species colors";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoFile {
    /// Species tree text, with the section's lines joined.
    pub species_tree: String,
    pub mapping: SpeciesMap,
    /// Sorted, distinct assigned species.
    pub species: Vec<String>,
    /// Species -> `#rrggbb` (or the hex string as given).
    pub colours: BTreeMap<String, String>,
    /// Problems that were skipped over while reading the colours.
    pub warnings: Vec<String>,
}

impl InfoFile {
    pub fn parse(text: &str) -> Result<Self> {
        let sections = split_sections(text);

        let species_tree = sections
            .get(TREE_SECTION)
            .ok_or_else(|| missing_section(TREE_SECTION))?
            .concat();
        let assignments = sections
            .get(ASSIGNMENT_SECTION)
            .ok_or_else(|| missing_section(ASSIGNMENT_SECTION))?;
        let mapping = parse_assignments(assignments)?;
        let species: Vec<String> = mapping.values().cloned().collect::<BTreeSet<_>>().into_iter().collect();

        let mut info = InfoFile {
            species_tree,
            mapping,
            species,
            ..Default::default()
        };
        let colour_lines = sections.get(COLOR_SECTION).or_else(|| sections.get(COLOUR_SECTION));
        if let Some(lines) = colour_lines {
            info.parse_colours(lines);
        }
        Ok(info)
    }

    fn parse_colours(&mut self, lines: &[&str]) {
        for line in lines {
            let Some((species, colour)) = line.split_once('=') else {
                self.warnings
                    .push(format!("could not interpret line in the information file \"{}\"", line));
                continue;
            };
            let (species, colour) = (species.trim(), colour.trim());
            if self.species.binary_search_by(|s| s.as_str().cmp(species)).is_err() {
                self.warnings.push(format!(
                    "could not set colour for species \"{}\" as it was unrecognized",
                    species
                ));
                continue;
            }
            match parse_colour(colour) {
                Some(hex) => {
                    self.colours.insert(species.to_string(), hex);
                }
                None => self.warnings.push(format!(
                    "could not set colour for species \"{}\" as the colour \"{}\" could not be interpreted",
                    species, colour
                )),
            }
        }
    }
}

fn missing_section(name: &str) -> MiphyError {
    MiphyError::validation(format!("the information file has no [{}] section", name))
}

/// Groups trimmed, non-blank lines under their `[section]` header.
fn split_sections(text: &str) -> BTreeMap<String, Vec<&str>> {
    let mut sections: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    let mut current = String::new();
    for line in text.lines().map(str::trim) {
        if let Some(header) = line.strip_prefix('[') {
            current = header.strip_suffix(']').unwrap_or(header).trim().to_lowercase();
            sections.entry(current.clone()).or_default();
        } else if !line.is_empty() {
            sections.entry(current.clone()).or_default().push(line);
        }
    }
    sections
}

fn parse_assignments(lines: &[&str]) -> Result<SpeciesMap> {
    let mut mapping = SpeciesMap::new();
    let mut species: Option<String> = None;

    for line in lines {
        let genes = match line.split_once('=') {
            Some((name, genes)) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(MiphyError::validation(format!(
                        "missing species name in the assignment line \"{}\"",
                        line
                    )));
                }
                if name.chars().any(char::is_whitespace) {
                    return Err(MiphyError::validation(format!(
                        "detected a blank in the species name '{}' in the information file. Newick trees cannot contain blanks.",
                        name
                    )));
                }
                species = Some(name.to_string());
                genes
            }
            // continuation of the previous species' list
            None => line,
        };
        let Some(current) = species.as_deref() else {
            return Err(MiphyError::validation(format!(
                "the assignment line \"{}\" does not follow a species name",
                line
            )));
        };

        for gene in genes.split(',').map(str::trim).filter(|g| !g.is_empty()) {
            if mapping.insert(gene.to_string(), current.to_string()).is_some() {
                return Err(MiphyError::validation(format!(
                    "in the information file, gene \"{}\" was assigned to more than 1 species",
                    gene
                )));
            }
        }
    }
    Ok(mapping)
}

/// `#rgb`, `#rrggbb` or `r,g,b` (0-255) to `#RRGGBB`-style hex.
pub fn parse_colour(colour: &str) -> Option<String> {
    if let Some(hex) = colour.strip_prefix('#') {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        return match hex.len() {
            3 => Some(hex.chars().fold(String::from("#"), |mut out, c| {
                out.push(c);
                out.push(c);
                out
            })),
            6 => Some(colour.to_string()),
            _ => None,
        };
    }

    let parts: Vec<&str> = colour.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return None;
    }
    let mut rgb = [0u8; 3];
    for (slot, part) in rgb.iter_mut().zip(parts) {
        *slot = part.parse().ok()?;
    }
    Some(format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2]))
}

/// Leaf renames `'name'` -> `name` for quoted leaves whose unquoted form is
/// mapped while the quoted form is not.
pub fn normalize_quoted_names<'a, I>(mapping: &SpeciesMap, leaves: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = &'a str>,
{
    leaves
        .into_iter()
        .filter(|leaf| !mapping.contains_key(*leaf))
        .filter_map(|leaf| {
            let mut chars = leaf.chars();
            let (first, last) = (chars.next()?, chars.next_back()?);
            if first != last || (first != '\'' && first != '"') {
                return None;
            }
            let inner = &leaf[1..leaf.len() - 1];
            mapping
                .contains_key(inner)
                .then(|| (leaf.to_string(), inner.to_string()))
        })
        .collect()
}

/// Groups leaf names by their lower-cased prefix of `prefix_size` characters.
pub fn group_by_prefix<'a, I>(names: I, prefix_size: usize) -> BTreeMap<String, Vec<String>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for name in names {
        let prefix: String = name.chars().take(prefix_size).collect::<String>().to_lowercase();
        groups.entry(prefix).or_default().push(name.to_string());
    }
    groups.values_mut().for_each(|genes| genes.sort());
    groups
}

/// Writes an information file with a star species tree over the groups.
pub fn render_info(groups: &BTreeMap<String, Vec<String>>) -> String {
    let species: Vec<&str> = groups.keys().map(String::as_str).collect();
    let mut lines = vec![
        format!("[{}]", TREE_SECTION),
        format!("({});\n", species.join(",")),
        format!("[{}]", ASSIGNMENT_SECTION),
    ];
    for (species, genes) in groups {
        lines.push(format!("{} = {}", species, genes.join(",")));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_forms() {
        assert_eq!(parse_colour("#f0a").as_deref(), Some("#ff00aa"));
        assert_eq!(parse_colour("#12ab34").as_deref(), Some("#12ab34"));
        assert_eq!(parse_colour("255, 0,16").as_deref(), Some("#FF0010"));
        assert_eq!(parse_colour("300,0,0"), None);
        assert_eq!(parse_colour("red"), None);
        assert_eq!(parse_colour("#12345"), None);
    }

    #[test]
    fn sections_are_case_insensitive() {
        let sections = split_sections("[Species Tree]\n(A,B);\n\n[species assignments]\nA = a\n");
        assert_eq!(sections[TREE_SECTION], vec!["(A,B);"]);
        assert_eq!(sections[ASSIGNMENT_SECTION], vec!["A = a"]);
    }
}
