//! Identifiers for upstream vector datasets

use crate::{MapSetError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Natural Earth style dataset category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Physical,
    Cultural,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Physical => "physical",
            Category::Cultural => "cultural",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = MapSetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "physical" => Ok(Category::Physical),
            "cultural" => Ok(Category::Cultural),
            other => Err(MapSetError::InvalidArgument(format!(
                "unknown category '{other}' (expected physical or cultural)"
            ))),
        }
    }
}

/// Dataset scale
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Resolution {
    /// 1:110m
    Coarse,
    /// 1:50m
    #[default]
    Medium,
    /// 1:10m
    Fine,
}

impl Resolution {
    pub const ALL: [Resolution; 3] = [Resolution::Coarse, Resolution::Medium, Resolution::Fine];

    /// Scale tag as used in Natural Earth file names
    pub fn scale(&self) -> &'static str {
        match self {
            Resolution::Coarse => "110m",
            Resolution::Medium => "50m",
            Resolution::Fine => "10m",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scale())
    }
}

impl FromStr for Resolution {
    type Err = MapSetError;

    /// Accepts scale tags (`110m`, `50m`, `10m`) and short codes (`l`, `i`, `h`)
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "110m" | "l" => Ok(Resolution::Coarse),
            "50m" | "i" => Ok(Resolution::Medium),
            "10m" | "h" => Ok(Resolution::Fine),
            other => Err(MapSetError::InvalidArgument(format!(
                "unknown resolution '{other}' (expected 110m|50m|10m or l|i|h)"
            ))),
        }
    }
}

/// Lookup key into a [`GeometryProvider`](crate::GeometryProvider)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GeometrySource {
    pub category: Category,
    pub name: String,
    pub resolution: Resolution,
}

impl GeometrySource {
    pub fn new(category: Category, name: impl Into<String>, resolution: Resolution) -> Self {
        Self {
            category,
            name: name.into(),
            resolution,
        }
    }

    pub fn coastline(resolution: Resolution) -> Self {
        Self::new(Category::Physical, "coastline", resolution)
    }

    /// Land boundaries between countries
    pub fn country_borders(resolution: Resolution) -> Self {
        Self::new(Category::Cultural, "admin_0_boundary_lines_land", resolution)
    }

    pub fn land(resolution: Resolution) -> Self {
        Self::new(Category::Physical, "land", resolution)
    }

    pub fn ocean(resolution: Resolution) -> Self {
        Self::new(Category::Physical, "ocean", resolution)
    }

    /// File stem following the Natural Earth convention, e.g. `ne_50m_coastline`
    pub fn file_stem(&self) -> String {
        format!("ne_{}_{}", self.resolution.scale(), self.name)
    }
}

impl fmt::Display for GeometrySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.file_stem())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_parsing() {
        assert_eq!("110m".parse::<Resolution>().unwrap(), Resolution::Coarse);
        assert_eq!("i".parse::<Resolution>().unwrap(), Resolution::Medium);
        assert_eq!("H".parse::<Resolution>().unwrap(), Resolution::Fine);
        assert!("25m".parse::<Resolution>().is_err());
    }

    #[test]
    fn test_resolution_default() {
        assert_eq!(Resolution::default(), Resolution::Medium);
    }

    #[test]
    fn test_file_stem() {
        let source = GeometrySource::country_borders(Resolution::Fine);
        assert_eq!(source.file_stem(), "ne_10m_admin_0_boundary_lines_land");
        assert_eq!(
            source.to_string(),
            "cultural/ne_10m_admin_0_boundary_lines_land"
        );
    }

    #[test]
    fn test_sources_are_distinct_keys() {
        let a = GeometrySource::coastline(Resolution::Medium);
        let b = GeometrySource::coastline(Resolution::Fine);
        assert_ne!(a, b);
        assert_eq!(a, GeometrySource::new(Category::Physical, "coastline", Resolution::Medium));
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Cultural".parse::<Category>().unwrap(), Category::Cultural);
        assert!("political".parse::<Category>().is_err());
    }
}
