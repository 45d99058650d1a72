//! Renderer-neutral layout of a resume: a title, a contact line and headed
//! sections made of blocks. Empty sections are dropped here so renderers
//! never have to check.

use crate::models::resume::{Education, Experience, Project};
use crate::models::ResumeRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    pub title: String,
    pub contact: Option<String>,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub heading: &'static str,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Bold line introducing one entry (a job, a degree, a project).
    EntryTitle(String),
    /// Secondary line under an entry title: dates, institution, stack.
    Detail(String),
    Paragraph(String),
    Bullet(String),
}

pub fn build_outline(record: &ResumeRecord) -> Outline {
    let contact = join_present(
        [
            record.email.as_deref(),
            record.phone.as_deref(),
            record.location.as_deref(),
            record.linkedin.as_deref(),
        ],
        " | ",
    );

    let mut sections = Vec::new();

    if let Some(summary) = present(record.professional_summary.as_deref()) {
        sections.push(Section {
            heading: "Professional Summary",
            blocks: vec![Block::Paragraph(summary.to_string())],
        });
    }

    push_section(
        &mut sections,
        "Education",
        record.education.iter().flatten().flat_map(education_blocks),
    );

    if let Some(skills) = record.skills.as_deref() {
        if let Some(line) = join_present(skills.iter().map(|s| Some(s.as_str())), ", ") {
            sections.push(Section {
                heading: "Skills",
                blocks: vec![Block::Paragraph(line)],
            });
        }
    }

    push_section(
        &mut sections,
        "Experience",
        record.experience.iter().flatten().flat_map(experience_blocks),
    );
    push_section(
        &mut sections,
        "Projects",
        record.projects.iter().flatten().flat_map(project_blocks),
    );
    push_section(
        &mut sections,
        "Achievements",
        bullets(record.achievements.as_deref()),
    );
    push_section(
        &mut sections,
        "Certifications",
        bullets(record.certifications.as_deref()),
    );

    Outline {
        title: record.display_name().to_string(),
        contact,
        sections,
    }
}

fn push_section(
    sections: &mut Vec<Section>,
    heading: &'static str,
    blocks: impl IntoIterator<Item = Block>,
) {
    let blocks: Vec<Block> = blocks.into_iter().collect();
    if !blocks.is_empty() {
        sections.push(Section { heading, blocks });
    }
}

fn education_blocks(edu: &Education) -> Vec<Block> {
    let mut blocks = Vec::new();
    let degree = match (present(edu.degree.as_deref()), present(edu.field.as_deref())) {
        (Some(d), Some(f)) => Some(format!("{d} in {f}")),
        (Some(d), None) => Some(d.to_string()),
        (None, Some(f)) => Some(f.to_string()),
        (None, None) => None,
    };
    let titled_by_degree = degree.is_some();
    if let Some(title) = degree.or_else(|| present(edu.institution.as_deref()).map(str::to_string)) {
        blocks.push(Block::EntryTitle(title));
    }
    let score = present(edu.score.as_deref()).map(|s| format!("Score: {s}"));
    let detail = join_present(
        [
            present(edu.institution.as_deref()).filter(|_| titled_by_degree),
            date_range(edu.start_date.as_deref(), edu.end_date.as_deref()).as_deref(),
            score.as_deref(),
        ],
        " | ",
    );
    if let Some(detail) = detail {
        blocks.push(Block::Detail(detail));
    }
    blocks
}

fn experience_blocks(exp: &Experience) -> Vec<Block> {
    let mut blocks = Vec::new();
    if let Some(title) = join_present([exp.role.as_deref(), exp.company.as_deref()], ", ") {
        blocks.push(Block::EntryTitle(title));
    }
    if let Some(dates) = date_range(exp.start_date.as_deref(), exp.end_date.as_deref()) {
        blocks.push(Block::Detail(dates));
    }
    blocks.extend(bullets(exp.achievements.as_deref()));
    blocks
}

fn project_blocks(project: &Project) -> Vec<Block> {
    let mut blocks = Vec::new();
    if let Some(name) = present(project.name.as_deref()) {
        blocks.push(Block::EntryTitle(name.to_string()));
    }
    if let Some(stack) = project
        .technologies
        .as_deref()
        .and_then(|t| join_present(t.iter().map(|s| Some(s.as_str())), ", "))
    {
        blocks.push(Block::Detail(format!("Technologies: {stack}")));
    }
    if let Some(description) = present(project.description.as_deref()) {
        blocks.push(Block::Paragraph(description.to_string()));
    }
    if let Some(impact) = present(project.impact.as_deref()) {
        blocks.push(Block::Paragraph(format!("Impact: {impact}")));
    }
    blocks
}

fn bullets(items: Option<&[String]>) -> Vec<Block> {
    items
        .unwrap_or_default()
        .iter()
        .filter_map(|s| present(Some(s)))
        .map(|s| Block::Bullet(s.to_string()))
        .collect()
}

fn date_range(start: Option<&str>, end: Option<&str>) -> Option<String> {
    match (present(start), present(end)) {
        (Some(s), Some(e)) => Some(format!("{s} - {e}")),
        (Some(s), None) => Some(s.to_string()),
        (None, Some(e)) => Some(e.to_string()),
        (None, None) => None,
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn join_present<'a>(
    parts: impl IntoIterator<Item = Option<&'a str>>,
    separator: &str,
) -> Option<String> {
    let parts: Vec<&str> = parts.into_iter().filter_map(present).collect();
    (!parts.is_empty()).then(|| parts.join(separator))
}
