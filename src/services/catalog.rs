// src/services/catalog.rs

//! School and course discovery service.
//!
//! Walks the portal's search form to enumerate schools and, per school,
//! the course offerings. The portal is form-driven: selecting a school
//! refreshes the page and the refreshed hidden fields must be posted
//! back before the course list appears.

use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{Catalog, Config, Course, PortalConfig, School, SchoolFilter};
use crate::pipeline::SearchWindow;
use crate::services::{FormParams, find_select_by_name, set_param};
use crate::utils::{element_text, http};

/// Service for discovering the portal's school/course hierarchy.
pub struct CatalogService<'a> {
    client: &'a reqwest::Client,
    config: &'a Config,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    pub fn new(client: &'a reqwest::Client, config: &'a Config) -> Self {
        Self { client, config }
    }

    /// Fetch the search page and collect its hidden form parameters plus
    /// the window and academic-year fields the portal expects on every
    /// subsequent request.
    pub async fn fetch_search_form(&self, window: &SearchWindow) -> Result<FormParams> {
        let url = self.config.portal.exam_list_url()?;
        let document = http::fetch_page(self.client, &url).await?;

        let mut params = extract_hidden_inputs(&document, &self.config.portal.search_form_id);
        set_param(
            &mut params,
            "data_da",
            &window.start.format("%d/%m/%Y").to_string(),
        );
        set_param(
            &mut params,
            "data_a",
            &window.end.format("%d/%m/%Y").to_string(),
        );
        set_param(&mut params, "aa_off_desc", &self.config.portal.academic_year);
        set_param(&mut params, "TIPO_FORM", "1");
        Ok(params)
    }

    /// List the schools offered on the search page.
    pub async fn list_schools(&self) -> Result<Vec<School>> {
        let url = self.config.portal.exam_list_url()?;
        let document = http::fetch_page(self.client, &url).await?;

        let select = find_school_select(&document, &self.config.portal)
            .ok_or_else(|| AppError::parse(format!("school select not found at {url}")))?;
        Ok(parse_school_options(select, &self.config.schools))
    }

    /// List the courses offered by one school.
    pub async fn list_courses(&self, form: &FormParams, school: &School) -> Result<Vec<Course>> {
        let url = self.config.portal.exam_list_url()?;

        // First POST selects the school and refreshes the page.
        let mut params = form.clone();
        set_param(&mut params, "fac_id", &school.id);
        let refreshed_page = http::post_form(self.client, &url, &params).await?;

        // The refreshed page carries new hidden fields; fall back to the
        // previous parameters when the form is missing from it.
        let mut refreshed =
            extract_hidden_inputs(&refreshed_page, &self.config.portal.search_form_id);
        if refreshed.is_empty() {
            refreshed = params;
        }
        set_param(&mut refreshed, "fac_id", &school.id);
        set_param(&mut refreshed, "aa_off_desc", &self.config.portal.academic_year);
        set_param(&mut refreshed, "ad_name", "");
        set_param(&mut refreshed, "stu_status", "1");
        set_param(&mut refreshed, "ad_mod", "");
        set_param(&mut refreshed, "tipoRicAd", "");
        set_param(&mut refreshed, "btnSelect1", "Avanti");

        let document = http::post_form(self.client, &url, &refreshed).await?;
        let select_name = &self.config.portal.course_select_name;
        let select = find_select_by_name(&document, select_name).ok_or_else(|| {
            AppError::parse(format!(
                "course select '{select_name}' missing for school {}",
                school.display_name
            ))
        })?;
        Ok(parse_course_options(select, &school.id))
    }

    /// Discover the full catalog: schools plus their course offerings,
    /// scanning up to the configured school limit.
    pub async fn discover(&self, form: &FormParams) -> Result<Catalog> {
        let schools = self.list_schools().await?;
        if schools.is_empty() {
            return Err(AppError::parse("no schools discovered on the portal"));
        }

        let limit = match self.config.schools.scan_limit {
            0 => schools.len(),
            n => n.min(schools.len()),
        };

        let delay = Duration::from_millis(self.config.http.request_delay_ms);
        let mut catalog = Catalog {
            schools,
            courses: Vec::new(),
        };

        for school in catalog.schools.iter().take(limit) {
            log::info!("Scanning {}...", school.display_name);
            match self.list_courses(form, school).await {
                Ok(courses) => {
                    log::info!("  found {} courses", courses.len());
                    catalog.courses.extend(courses);
                }
                Err(e) => {
                    log::warn!("  course listing failed for {}: {e}", school.display_name);
                }
            }
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        Ok(catalog)
    }

    /// Inspect the search page structure: selects, forms, hidden inputs.
    ///
    /// Debugging aid for when the portal's markup drifts.
    pub async fn inspect_page(&self) -> Result<PageStructure> {
        let url = self.config.portal.exam_list_url()?;
        let document = http::fetch_page(self.client, &url).await?;
        Ok(PageStructure::from_document(&document))
    }
}

/// Collect the hidden inputs of a form by its id.
fn extract_hidden_inputs(document: &Html, form_id: &str) -> FormParams {
    let Ok(selector) = Selector::parse(&format!("form#{form_id} input[type=\"hidden\"]")) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter_map(|input| {
            let name = input.value().attr("name")?;
            let value = input.value().attr("value").unwrap_or("");
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

/// Locate the school `<select>`.
///
/// Tried in order: the configured candidate names, a keyword scan over
/// id/class/name attributes, and finally the select with the most
/// non-empty options.
fn find_school_select<'a>(document: &'a Html, portal: &PortalConfig) -> Option<ElementRef<'a>> {
    for name in &portal.school_select_names {
        if let Some(select) = find_select_by_name(document, name) {
            return Some(select);
        }
    }

    let all_selects = Selector::parse("select").ok()?;
    for select in document.select(&all_selects) {
        let attrs = format!(
            "{} {} {}",
            select.value().attr("id").unwrap_or(""),
            select.value().attr("class").unwrap_or(""),
            select.value().attr("name").unwrap_or("")
        )
        .to_lowercase();
        if portal
            .school_select_keywords
            .iter()
            .any(|keyword| attrs.contains(keyword.as_str()))
        {
            return Some(select);
        }
    }

    document
        .select(&all_selects)
        .max_by_key(|select| option_count(select))
        .filter(|select| option_count(select) > 2)
}

fn option_count(select: &ElementRef) -> usize {
    let Ok(option_sel) = Selector::parse("option") else {
        return 0;
    };
    select
        .select(&option_sel)
        .filter(|option| {
            option
                .value()
                .attr("value")
                .is_some_and(|v| !v.trim().is_empty())
        })
        .count()
}

/// Parse school options, keeping only entries that pass the real-school
/// predicate.
fn parse_school_options(select: ElementRef, filter: &SchoolFilter) -> Vec<School> {
    let Ok(option_sel) = Selector::parse("option") else {
        return Vec::new();
    };
    select
        .select(&option_sel)
        .filter_map(|option| {
            let id = option.value().attr("value").unwrap_or("").trim().to_string();
            let display_name = element_text(&option);
            if id.is_empty() || id == "0" {
                return None;
            }
            if !filter.is_real_school(&display_name) {
                return None;
            }
            Some(School { id, display_name })
        })
        .collect()
}

/// Parse course options; very short texts are placeholder entries.
fn parse_course_options(select: ElementRef, school_id: &str) -> Vec<Course> {
    let Ok(option_sel) = Selector::parse("option") else {
        return Vec::new();
    };
    select
        .select(&option_sel)
        .filter_map(|option| {
            let id = option.value().attr("value").unwrap_or("").trim().to_string();
            let name = element_text(&option);
            if id.is_empty() || name.chars().count() <= 3 {
                return None;
            }
            Some(Course {
                id,
                name,
                school_id: school_id.to_string(),
            })
        })
        .collect()
}

/// Structure of the search page, for `--debug-page`.
#[derive(Debug, Serialize)]
pub struct PageStructure {
    pub page_title: String,
    pub selects: Vec<SelectInfo>,
    pub forms: Vec<FormInfo>,
    pub hidden_inputs: Vec<HiddenInput>,
}

#[derive(Debug, Serialize)]
pub struct SelectInfo {
    pub name: String,
    pub id: String,
    pub option_count: usize,
    pub first_options: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FormInfo {
    pub id: String,
    pub name: String,
    pub action: String,
    pub method: String,
}

#[derive(Debug, Serialize)]
pub struct HiddenInput {
    pub name: String,
    pub value: String,
}

impl PageStructure {
    fn from_document(document: &Html) -> Self {
        let attr = |el: &ElementRef, name: &str| el.value().attr(name).unwrap_or("").to_string();

        let title = Selector::parse("title")
            .ok()
            .and_then(|sel| document.select(&sel).next().map(|t| element_text(&t)))
            .unwrap_or_default();

        let mut selects = Vec::new();
        if let (Ok(select_sel), Ok(option_sel)) =
            (Selector::parse("select"), Selector::parse("option"))
        {
            for select in document.select(&select_sel) {
                let options: Vec<_> = select.select(&option_sel).collect();
                selects.push(SelectInfo {
                    name: attr(&select, "name"),
                    id: attr(&select, "id"),
                    option_count: options.len(),
                    first_options: options
                        .iter()
                        .take(5)
                        .map(|o| element_text(o))
                        .collect(),
                });
            }
        }

        let mut forms = Vec::new();
        if let Ok(form_sel) = Selector::parse("form") {
            for form in document.select(&form_sel) {
                forms.push(FormInfo {
                    id: attr(&form, "id"),
                    name: attr(&form, "name"),
                    action: attr(&form, "action"),
                    method: attr(&form, "method"),
                });
            }
        }

        let mut hidden_inputs = Vec::new();
        if let Ok(hidden_sel) = Selector::parse("input[type=\"hidden\"]") {
            for input in document.select(&hidden_sel) {
                hidden_inputs.push(HiddenInput {
                    name: attr(&input, "name"),
                    value: attr(&input, "value"),
                });
            }
        }

        Self {
            page_title: title,
            selects,
            forms,
            hidden_inputs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SchoolFilter;

    const SEARCH_PAGE: &str = r#"
        <html><head><title>Lista appelli</title></head><body>
        <form id="formRicercaCds" action="ListaAppelliOfferta.do" method="post">
            <input type="hidden" name="SESSION_ID" value="abc123">
            <input type="hidden" name="TIPO_FORM" value="0">
            <select name="fac_id">
                <option value="">-- Seleziona --</option>
                <option value="0">Tutte</option>
                <option value="10021">Scuola delle Scienze, dell'Ingegneria e della Salute</option>
                <option value="10022">Dipartimento di Scienze Motorie</option>
                <option value="10023">[S1] Scuola di Economia</option>
            </select>
        </form>
        </body></html>
    "#;

    #[test]
    fn test_extract_hidden_inputs() {
        let document = Html::parse_document(SEARCH_PAGE);
        let params = extract_hidden_inputs(&document, "formRicercaCds");
        assert_eq!(
            params,
            vec![
                ("SESSION_ID".to_string(), "abc123".to_string()),
                ("TIPO_FORM".to_string(), "0".to_string()),
            ]
        );
    }

    #[test]
    fn test_school_select_found_by_candidate_name() {
        let document = Html::parse_document(SEARCH_PAGE);
        let portal = PortalConfig::default();
        let select = find_school_select(&document, &portal).unwrap();
        assert_eq!(select.value().attr("name"), Some("fac_id"));
    }

    #[test]
    fn test_school_select_found_by_keyword_scan() {
        let document = Html::parse_document(
            r#"<select id="sceltaFacolta" name="x1">
                 <option value="1">A</option>
               </select>"#,
        );
        let portal = PortalConfig::default();
        let select = find_school_select(&document, &portal).unwrap();
        assert_eq!(select.value().attr("id"), Some("sceltaFacolta"));
    }

    #[test]
    fn test_school_select_fallback_to_largest() {
        let document = Html::parse_document(
            r#"<select name="x1"><option value="1">A</option></select>
               <select name="x2">
                 <option value="1">A</option>
                 <option value="2">B</option>
                 <option value="3">C</option>
               </select>"#,
        );
        let portal = PortalConfig {
            school_select_names: Vec::new(),
            school_select_keywords: Vec::new(),
            ..PortalConfig::default()
        };
        let select = find_school_select(&document, &portal).unwrap();
        assert_eq!(select.value().attr("name"), Some("x2"));
    }

    #[test]
    fn test_parse_school_options_filters_departments() {
        let document = Html::parse_document(SEARCH_PAGE);
        let portal = PortalConfig::default();
        let select = find_school_select(&document, &portal).unwrap();
        let schools = parse_school_options(select, &SchoolFilter::default());

        let names: Vec<_> = schools.iter().map(|s| s.display_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Scuola delle Scienze, dell'Ingegneria e della Salute",
                "[S1] Scuola di Economia",
            ]
        );
        assert_eq!(schools[0].id, "10021");
    }

    #[test]
    fn test_parse_course_options_skips_placeholders() {
        let document = Html::parse_document(
            r#"<select name="cds_id">
                 <option value="">-- Seleziona --</option>
                 <option value="335">CYBERSECURITY</option>
                 <option value="336">ICT</option>
                 <option value="337">INGEGNERIA INFORMATICA</option>
               </select>"#,
        );
        let select = find_select_by_name(&document, "cds_id").unwrap();
        let courses = parse_course_options(select, "10021");

        let names: Vec<_> = courses.iter().map(|c| c.name.as_str()).collect();
        // "ICT" is three characters, treated as a placeholder.
        assert_eq!(names, vec!["CYBERSECURITY", "INGEGNERIA INFORMATICA"]);
        assert!(courses.iter().all(|c| c.school_id == "10021"));
    }

    #[test]
    fn test_page_structure_inspection() {
        let document = Html::parse_document(SEARCH_PAGE);
        let structure = PageStructure::from_document(&document);
        assert_eq!(structure.page_title, "Lista appelli");
        assert_eq!(structure.forms.len(), 1);
        assert_eq!(structure.selects.len(), 1);
        assert_eq!(structure.hidden_inputs.len(), 2);
    }
}
