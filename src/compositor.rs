//! The sequential, cursor-based page compositor.
//!
//! Sections are visited in a fixed order and drawn top to bottom while a single cursor tracks the
//! vertical offset of the next line. Before each section heading the cursor is compared with a
//! threshold and a new page is started when it is past it; content is never split inside a
//! section. Once every section is drawn, a footer with the page number is stamped on each page.

use sha2::{Digest as _, Sha256};

use crate::configuration::{parse_hex_color, RenderConfiguration};
use crate::document::{Document, Operation};
use crate::error::{ContextError, ErrorKind};
use crate::fonts::{text_width, StandardFont};
use crate::resume::{
    Certification, Education, Language, PersonalInfo, Project, Reference, Resume, Skill,
    WorkExperience,
};
use crate::template::{HeaderStyle, TemplateInfo, TemplateLookup};
use crate::text::{format_date_range, truncate_to_width, wrap_text};

/// Number of skill rows in each column.
pub const SKILLS_PER_COLUMN: usize = 6;
/// Number of skill columns; skills which do not fit in these columns are left out.
pub const SKILL_COLUMNS: usize = 2;

const BLACK: [f32; 3] = [0.1, 0.1, 0.1];
const GREY: [f32; 3] = [0.42, 0.45, 0.5];
const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

const NAME_FONT_SIZE: f32 = 24.0;
const TITLE_FONT_SIZE: f32 = 13.0;
const ENTRY_TITLE_FONT_SIZE: f32 = 11.0;
const DETAIL_FONT_SIZE: f32 = 9.0;
const FOOTER_FONT_SIZE: f32 = 8.0;

const BANNER_HEIGHT: f32 = 40.0;
/// Space between the cursor and the baseline of a heading.
const HEADING_ASCENT: f32 = 5.0;
/// Advance of the cursor past a heading and its underline.
const HEADING_ADVANCE: f32 = 12.0;
const SECTION_SPACING: f32 = 4.0;
const ENTRY_SPACING: f32 = 3.0;
const BULLET_INDENT: f32 = 5.0;
const CONTACT_SEPARATOR: &str = " | ";

/// Resolves the template and lays the résumé out with the given configuration.
pub fn compose_resume(
    resume: &Resume,
    template_id: &str,
    templates: &impl TemplateLookup,
    configuration: &RenderConfiguration,
) -> Result<Document, ContextError> {
    let template = templates.resolve(template_id)?;
    Compositor::new(configuration, &template)?.compose(resume)
}

/// Font, size and color of a run of text.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TextStyle {
    font: StandardFont,
    font_size: f32,
    color: [f32; 3],
}

impl TextStyle {
    fn new(font: StandardFont, font_size: f32, color: [f32; 3]) -> Self {
        TextStyle {
            font,
            font_size,
            color,
        }
    }

    fn width_of(&self, text: &str) -> f32 {
        text_width(text, self.font, self.font_size)
    }
}

/// The state of one layout run: the pages drawn so far and the cursor on the last one.
pub struct Compositor<'a> {
    configuration: &'a RenderConfiguration,
    template: &'a TemplateInfo,
    accent_color: [f32; 3],
    pages: Vec<Vec<Operation>>,
    cursor: f32,
}

impl<'a> Compositor<'a> {
    pub fn new(
        configuration: &'a RenderConfiguration,
        template: &'a TemplateInfo,
    ) -> Result<Self, ContextError> {
        configuration.validate()?;
        let accent_color = match &configuration.accent_color {
            Some(accent_color) => parse_hex_color(accent_color)?,
            None => template.accent_color,
        };

        Ok(Compositor {
            configuration,
            template,
            accent_color,
            pages: Vec::new(),
            cursor: configuration.margins.top,
        })
    }

    /// Runs the layout over every section and returns the finished document.
    pub fn compose(mut self, resume: &Resume) -> Result<Document, ContextError> {
        self.start_page();

        self.compose_header(&resume.personal_info);
        self.compose_summary(&resume.summary);
        self.compose_work_experience(&resume.work_experience);
        self.compose_skills(&resume.skills);
        self.compose_education(&resume.education);
        self.compose_languages(&resume.languages);
        self.compose_references(&resume.references);
        self.compose_certifications(&resume.certifications);
        self.compose_projects(&resume.projects);
        self.compose_hobbies(&resume.hobbies);

        self.stamp_footers();
        self.into_document(resume)
    }

    fn start_page(&mut self) {
        if !self.pages.is_empty() {
            log::debug!(
                "Starting page {} with the cursor at {:.1}mm",
                self.pages.len() + 1,
                self.cursor
            );
        }
        self.pages.push(Vec::new());
        self.cursor = self.configuration.margins.top;
    }

    fn push(&mut self, operation: Operation) {
        // `start_page` runs before anything is drawn, so there always is a last page
        if let Some(page) = self.pages.last_mut() {
            page.push(operation);
        }
    }

    fn left(&self) -> f32 {
        self.configuration.margins.left
    }

    fn right(&self) -> f32 {
        self.configuration.page_width - self.configuration.margins.right
    }

    fn body(&self) -> TextStyle {
        TextStyle::new(StandardFont::Helvetica, self.configuration.body_font_size, BLACK)
    }

    fn detail(&self) -> TextStyle {
        TextStyle::new(StandardFont::Helvetica, DETAIL_FONT_SIZE, GREY)
    }

    /// Oblique body text in the accent color, used below entry titles.
    fn subtitle(&self) -> TextStyle {
        TextStyle::new(
            StandardFont::HelveticaOblique,
            self.configuration.body_font_size,
            self.accent_color,
        )
    }

    fn bullet(&self) -> TextStyle {
        TextStyle {
            color: self.accent_color,
            ..self.body()
        }
    }

    fn write(&mut self, text: &str, [x, y]: [f32; 2], style: TextStyle) {
        if text.is_empty() {
            return;
        }
        self.push(Operation::WriteText {
            text: text.to_string(),
            position: [x, y],
            font: style.font,
            font_size: style.font_size,
            color: style.color,
        });
    }

    /// Writes the text on the baseline `y` so that it ends at the right margin.
    fn write_right_aligned(&mut self, text: &str, y: f32, style: TextStyle) {
        let x = self.right() - style.width_of(text);
        self.write(text, [x, y], style);
    }

    /// Writes one line at the cursor and moves the cursor to the next line.
    fn write_line(&mut self, text: &str, x: f32, style: TextStyle) {
        if text.is_empty() {
            return;
        }
        self.write(text, [x, self.cursor], style);
        self.cursor += self.configuration.line_height;
    }

    /// Wraps the text to the width right of `x` and writes every resulting line.
    fn write_paragraph(&mut self, text: &str, x: f32, style: TextStyle) {
        let maximum_width = self.right() - x;
        for line in wrap_text(text, style.font, style.font_size, maximum_width) {
            self.write_line(&line, x, style);
        }
    }

    fn draw_rule(&mut self, y: f32) {
        self.push(Operation::DrawLine {
            from: [self.left(), y],
            to: [self.right(), y],
            line_width: 0.4,
            color: self.accent_color,
        });
    }

    /// Starts a section, breaking the page first when the cursor is past the threshold.
    fn begin_section(&mut self, title: &str, page_break_threshold: f32) {
        if self.cursor > page_break_threshold {
            self.start_page();
        }

        let baseline = self.cursor + HEADING_ASCENT;
        let style = TextStyle::new(
            StandardFont::HelveticaBold,
            self.configuration.heading_font_size,
            self.accent_color,
        );
        self.write(title, [self.left(), baseline], style);
        self.draw_rule(baseline + 2.0);
        self.cursor += HEADING_ADVANCE;
    }

    fn end_section(&mut self) {
        self.cursor += SECTION_SPACING;
    }

    fn compose_header(&mut self, personal_info: &PersonalInfo) {
        let full_name = personal_info.full_name();
        let left = self.left();

        match self.template.header {
            HeaderStyle::Banner => {
                self.push(Operation::DrawRectangle {
                    position: [0.0, 0.0],
                    size: [self.configuration.page_width, BANNER_HEIGHT],
                    color: self.accent_color,
                });
                let name_style = TextStyle::new(StandardFont::HelveticaBold, NAME_FONT_SIZE, WHITE);
                let title_style = TextStyle::new(StandardFont::Helvetica, TITLE_FONT_SIZE, WHITE);
                self.write(&full_name, [left, 18.0], name_style);
                self.write(&personal_info.title, [left, 28.0], title_style);
                self.cursor = (BANNER_HEIGHT + 8.0).max(self.configuration.margins.top);
            }
            HeaderStyle::Rule => {
                let top = self.configuration.margins.top;
                let name_style =
                    TextStyle::new(StandardFont::HelveticaBold, NAME_FONT_SIZE, self.accent_color);
                let title_style = TextStyle::new(StandardFont::Helvetica, TITLE_FONT_SIZE, BLACK);
                self.write(&full_name, [left, top + 4.0], name_style);
                self.write(&personal_info.title, [left, top + 12.0], title_style);
                self.draw_rule(top + 16.0);
                self.cursor = top + 23.0;
            }
        }

        let contact_line = personal_info.contact_details().join(CONTACT_SEPARATOR);
        if !contact_line.is_empty() {
            self.write_paragraph(&contact_line, left, self.detail());
            self.end_section();
        }
    }

    fn compose_summary(&mut self, summary: &str) {
        if summary.is_empty() {
            return;
        }
        self.begin_section("Professional Summary", self.configuration.page_break_threshold);
        self.write_paragraph(summary, self.left(), self.body());
        self.end_section();
    }

    /// Writes the bold title of an entry with its period right-aligned on the same baseline.
    fn write_entry_title(&mut self, title: &str, period: &str) {
        let title_style = TextStyle::new(StandardFont::HelveticaBold, ENTRY_TITLE_FONT_SIZE, BLACK);
        self.write(title, [self.left(), self.cursor], title_style);
        self.write_right_aligned(period, self.cursor, self.detail());
        self.cursor += self.configuration.line_height;
    }

    fn write_bullet(&mut self, text: &str) {
        self.write("•", [self.left() + 1.0, self.cursor], self.bullet());
        self.write_paragraph(text, self.left() + BULLET_INDENT, self.body());
    }

    fn compose_work_experience(&mut self, work_experience: &[WorkExperience]) {
        if work_experience.is_empty() {
            return;
        }
        self.begin_section("Work Experience", self.configuration.page_break_threshold);
        let left = self.left();

        for entry in work_experience {
            let (title, organization) = if entry.job_title.is_empty() {
                (entry.company.as_str(), "")
            } else {
                (entry.job_title.as_str(), entry.company.as_str())
            };
            let period = format_date_range(&entry.start_date, &entry.end_date, entry.is_current);
            self.write_entry_title(title, &period);

            let subtitle = join_non_empty(&[organization, &entry.location], CONTACT_SEPARATOR);
            self.write_line(&subtitle, left, self.subtitle());
            self.write_paragraph(&entry.description, left, self.body());
            for achievement in &entry.achievements {
                self.write_bullet(achievement);
            }
            self.cursor += ENTRY_SPACING;
        }
        self.end_section();
    }

    fn compose_skills(&mut self, skills: &[Skill]) {
        if skills.is_empty() {
            return;
        }
        self.begin_section("Skills", self.configuration.page_break_threshold);

        let line_height = self.configuration.line_height;
        let column_width = self.configuration.content_width() / SKILL_COLUMNS as f32;
        let capacity = SKILLS_PER_COLUMN * SKILL_COLUMNS;
        if skills.len() > capacity {
            log::warn!(
                "Leaving out {} skills which do not fit in {} columns",
                skills.len() - capacity,
                SKILL_COLUMNS
            );
        }

        let top = self.cursor;
        let style = self.body();
        for (index, skill) in skills.iter().enumerate().take(capacity) {
            let (x, y) = skill_cell(index, self.left(), top, column_width, line_height);
            let label = truncate_to_width(
                &skill_label(skill),
                style.font,
                style.font_size,
                column_width - BULLET_INDENT,
            );
            self.write("•", [x + 1.0, y], self.bullet());
            self.write(&label, [x + BULLET_INDENT, y], style);
        }

        let rows = skills.len().min(SKILLS_PER_COLUMN);
        self.cursor = top + rows as f32 * line_height;
        self.end_section();
    }

    fn compose_education(&mut self, education: &[Education]) {
        if education.is_empty() {
            return;
        }
        self.begin_section("Education", self.configuration.page_break_threshold);
        let left = self.left();

        for entry in education {
            let (title, institution) = if entry.degree.is_empty() {
                (entry.institution.clone(), "")
            } else if entry.field_of_study.is_empty() {
                (entry.degree.clone(), entry.institution.as_str())
            } else {
                (
                    format!("{} in {}", entry.degree, entry.field_of_study),
                    entry.institution.as_str(),
                )
            };
            let period = format_date_range(&entry.start_date, &entry.end_date, false);
            self.write_entry_title(&title, &period);

            let subtitle = join_non_empty(&[institution, &entry.location], CONTACT_SEPARATOR);
            self.write_line(&subtitle, left, self.subtitle());
            if !entry.gpa.is_empty() {
                self.write_line(&format!("GPA: {}", entry.gpa), left, self.body());
            }
            self.write_paragraph(&entry.description, left, self.body());
            self.cursor += ENTRY_SPACING;
        }
        self.end_section();
    }

    fn compose_languages(&mut self, languages: &[Language]) {
        if languages.is_empty() {
            return;
        }
        self.begin_section("Languages", self.configuration.page_break_threshold);

        for language in languages {
            self.write_line(&language_label(language), self.left(), self.body());
        }
        self.end_section();
    }

    fn compose_references(&mut self, references: &[Reference]) {
        if references.is_empty() {
            return;
        }
        let threshold = self.configuration.references_page_break_threshold;
        self.begin_section("References", threshold);
        let left = self.left();
        let name_style = TextStyle {
            font: StandardFont::HelveticaBold,
            ..self.body()
        };
        let affiliation_style = TextStyle {
            font: StandardFont::HelveticaOblique,
            color: GREY,
            ..self.body()
        };

        for reference in references {
            self.write_line(&reference.name, left, name_style);
            let affiliation = join_non_empty(&[&reference.position, &reference.company], ", ");
            self.write_line(&affiliation, left, affiliation_style);
            let contact = join_non_empty(&[&reference.email, &reference.phone], CONTACT_SEPARATOR);
            self.write_line(&contact, left, self.detail());
            self.cursor += ENTRY_SPACING;
        }
        self.end_section();
    }

    fn compose_certifications(&mut self, certifications: &[Certification]) {
        if certifications.is_empty() {
            return;
        }
        self.begin_section("Certifications", self.configuration.page_break_threshold);

        for certification in certifications {
            let label = join_non_empty(&[&certification.name, &certification.issuer], " - ");
            self.write(&label, [self.left(), self.cursor], self.body());
            self.write_right_aligned(&certification.date, self.cursor, self.detail());
            self.cursor += self.configuration.line_height;
        }
        self.end_section();
    }

    fn compose_projects(&mut self, projects: &[Project]) {
        if projects.is_empty() {
            return;
        }
        self.begin_section("Projects", self.configuration.page_break_threshold);
        let left = self.left();
        let url_style = TextStyle {
            color: self.accent_color,
            ..self.detail()
        };

        for project in projects {
            self.write_entry_title(&project.name, "");
            self.write_line(&project.url, left, url_style);
            self.write_paragraph(&project.description, left, self.body());
            if !project.technologies.is_empty() {
                let technologies = format!("Technologies: {}", project.technologies.join(", "));
                self.write_paragraph(&technologies, left, self.detail());
            }
            self.cursor += ENTRY_SPACING;
        }
        self.end_section();
    }

    fn compose_hobbies(&mut self, hobbies: &[String]) {
        if hobbies.is_empty() {
            return;
        }
        self.begin_section("Interests", self.configuration.page_break_threshold);
        self.write_paragraph(&hobbies.join(", "), self.left(), self.body());
        self.end_section();
    }

    /// Stamps the branding and `Page i of N` on every page. Runs once all the pages exist.
    fn stamp_footers(&mut self) {
        let page_count = self.pages.len();
        let baseline = self.configuration.page_height - self.configuration.footer_offset;
        let style = TextStyle::new(StandardFont::Helvetica, FOOTER_FONT_SIZE, GREY);
        let branding = self.configuration.branding.clone();
        let (left, right) = (self.left(), self.right());

        for (page_index, page) in self.pages.iter_mut().enumerate() {
            let page_label = format!("Page {} of {}", page_index + 1, page_count);
            let footer = [
                (branding.as_str(), left),
                (page_label.as_str(), right - style.width_of(&page_label)),
            ];
            for (text, x) in footer.into_iter().filter(|(text, _)| !text.is_empty()) {
                page.push(Operation::WriteText {
                    text: text.to_string(),
                    position: [x, baseline],
                    font: style.font,
                    font_size: style.font_size,
                    color: style.color,
                });
            }
        }
    }

    fn into_document(self, resume: &Resume) -> Result<Document, ContextError> {
        let (document_id, instance_id) =
            document_identifiers(resume, self.template, self.configuration)?;
        let full_name = resume.personal_info.full_name();
        let title = if full_name.is_empty() {
            "Curriculum Vitae".to_string()
        } else {
            format!("{full_name} - Curriculum Vitae")
        };

        let page_width = self.configuration.page_width;
        let page_height = self.configuration.page_height;
        let operations = self
            .pages
            .into_iter()
            .flat_map(|page| {
                std::iter::once(Operation::AppendNewPage {
                    page_width,
                    page_height,
                })
                .chain(page)
            })
            .collect();

        Ok(Document {
            document_id,
            instance_id,
            title,
            author: full_name,
            operations,
        })
    }
}

/// Column `index / SKILLS_PER_COLUMN`, row `index % SKILLS_PER_COLUMN`.
pub fn skill_cell(
    index: usize,
    left: f32,
    top: f32,
    column_width: f32,
    line_height: f32,
) -> (f32, f32) {
    let column = index / SKILLS_PER_COLUMN;
    let row = index % SKILLS_PER_COLUMN;
    (
        left + column as f32 * column_width,
        top + row as f32 * line_height,
    )
}

pub fn skill_label(skill: &Skill) -> String {
    if skill.level.is_empty() {
        skill.name.clone()
    } else {
        format!("{} ({})", skill.name, skill.level)
    }
}

pub fn language_label(language: &Language) -> String {
    join_non_empty(&[&language.name, &language.proficiency], " - ")
}

fn join_non_empty(parts: &[&str], separator: &str) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(separator)
}

/// Derives the document and instance identifiers from a digest of everything that shapes the
/// output, so that the same input always yields the same PDF bytes.
fn document_identifiers(
    resume: &Resume,
    template: &TemplateInfo,
    configuration: &RenderConfiguration,
) -> Result<(String, String), ContextError> {
    let serialized = serde_json::to_vec(&(resume, template, configuration)).map_err(|error| {
        ContextError::with_error(
            ErrorKind::Pdf,
            "Unable to serialize the document inputs",
            &error,
        )
    })?;
    let digest = Sha256::digest(&serialized);
    let hex: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();

    Ok((hex[..32].to_string(), hex[32..].to_string()))
}
