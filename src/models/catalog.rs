// src/models/catalog.rs

//! School, course, and catalog data structures.

use serde::{Deserialize, Serialize};

/// A top-level academic unit offering courses.
///
/// Distinct from a generic "department" grouping; see
/// [`SchoolFilter::is_real_school`](crate::models::SchoolFilter::is_real_school).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct School {
    /// Portal identifier (the option value of the school select)
    pub id: String,

    /// Display name as shown on the portal
    pub display_name: String,
}

/// A course offering within a school.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Course {
    /// Portal identifier (the option value of the course select)
    pub id: String,

    /// Display name
    pub name: String,

    /// Identifier of the school offering the course
    pub school_id: String,
}

/// Everything discovered from the portal during one run.
///
/// Replaces process-wide caches: the discoverer produces a catalog, the
/// matcher reads it, and it is dropped when the run ends.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Catalog {
    pub schools: Vec<School>,
    pub courses: Vec<Course>,
}

impl Catalog {
    /// Display name of a school by its portal id.
    pub fn school_name(&self, school_id: &str) -> Option<&str> {
        self.schools
            .iter()
            .find(|s| s.id == school_id)
            .map(|s| s.display_name.as_str())
    }

    /// Courses offered by one school.
    pub fn courses_of(&self, school_id: &str) -> impl Iterator<Item = &Course> {
        self.courses.iter().filter(move |c| c.school_id == school_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> Catalog {
        Catalog {
            schools: vec![School {
                id: "10021".to_string(),
                display_name: "Scuola delle Scienze".to_string(),
            }],
            courses: vec![
                Course {
                    id: "335".to_string(),
                    name: "CYBERSECURITY".to_string(),
                    school_id: "10021".to_string(),
                },
                Course {
                    id: "336".to_string(),
                    name: "INFORMATICA".to_string(),
                    school_id: "10022".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_school_name() {
        let catalog = sample_catalog();
        assert_eq!(catalog.school_name("10021"), Some("Scuola delle Scienze"));
        assert_eq!(catalog.school_name("99999"), None);
    }

    #[test]
    fn test_courses_of() {
        let catalog = sample_catalog();
        let names: Vec<_> = catalog.courses_of("10021").map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["CYBERSECURITY"]);
    }
}
