use cvpress::{
    compositor::{compose_resume, SKILLS_PER_COLUMN, SKILL_COLUMNS},
    configuration::RenderConfiguration,
    document::{Document, Operation},
    error::ErrorKind,
    record::ResumeRecord,
    resume::Resume,
    template::BuiltinTemplates,
};
use serde_json::json;

fn compose(record: serde_json::Value, template_id: &str) -> Document {
    let record = ResumeRecord::from_value(record).unwrap();
    compose_resume(
        &Resume::from_record(&record),
        template_id,
        &BuiltinTemplates::new(),
        &RenderConfiguration::default(),
    )
    .unwrap()
}

/// Text operations of one page along with their position.
fn page_texts(document: &Document, page_index: usize) -> Vec<(String, [f32; 2])> {
    document.pages()[page_index]
        .operations
        .iter()
        .filter_map(|operation| match operation {
            Operation::WriteText { text, position, .. } => Some((text.clone(), *position)),
            _ => None,
        })
        .collect()
}

fn all_texts(document: &Document) -> Vec<String> {
    (0..document.page_count())
        .flat_map(|page_index| page_texts(document, page_index))
        .map(|(text, _)| text)
        .collect()
}

#[test]
fn empty_record_yields_a_header_and_a_footer() {
    let document = compose(json!({}), "modern");

    assert_eq!(document.page_count(), 1);
    let texts = all_texts(&document);
    similar_asserts::assert_eq!(
        texts,
        vec!["Created with cvpress".to_string(), "Page 1 of 1".to_string()]
    );
    assert_eq!(document.title, "Curriculum Vitae");
}

#[test]
fn footers_sit_at_the_configured_offset() {
    let document = compose(json!({ "summary": "Short summary." }), "minimal");
    let configuration = RenderConfiguration::default();
    let footer_baseline = configuration.page_height - configuration.footer_offset;

    let (_, position) = page_texts(&document, 0)
        .into_iter()
        .find(|(text, _)| text == "Page 1 of 1")
        .unwrap();
    assert_eq!(position[1], footer_baseline);
    assert!(position[0] > configuration.page_width / 2.0);
}

#[test]
fn sections_follow_the_fixed_order() {
    let record: serde_json::Value =
        serde_json::from_str(include_str!("fixtures/complete_resume.json")).unwrap();
    let document = compose(record, "classic");
    let texts = all_texts(&document);

    let headings = [
        "Professional Summary",
        "Work Experience",
        "Skills",
        "Education",
        "Languages",
        "References",
        "Certifications",
        "Projects",
        "Interests",
    ];
    let positions: Vec<usize> = headings
        .iter()
        .map(|heading| {
            texts
                .iter()
                .position(|text| text == heading)
                .unwrap_or_else(|| panic!("missing heading {heading}"))
        })
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));

    assert!(texts.contains(&"Oct 1842 - Sep 1843".to_string()));
    assert!(texts.contains(&"Jan 1844 - Present".to_string()));
    assert!(texts.contains(&"Private tutoring in Mathematics".to_string()));
    assert!(texts.contains(&"English - Native".to_string()));
    assert!(texts.contains(&"Horse riding, poetry, music".to_string()));
}

#[test]
fn skills_beyond_the_columns_are_left_out() {
    let capacity = SKILLS_PER_COLUMN * SKILL_COLUMNS;
    let skills: Vec<String> = (0..=capacity).map(|index| format!("Skill{index}")).collect();
    let document = compose(json!({ "skills": skills }), "modern");
    let texts = page_texts(&document, 0);

    let skill_positions: Vec<[f32; 2]> = (0..capacity)
        .map(|index| {
            texts
                .iter()
                .find(|(text, _)| *text == format!("Skill{index}"))
                .unwrap_or_else(|| panic!("missing Skill{index}"))
                .1
        })
        .collect();
    assert!(!texts.iter().any(|(text, _)| *text == format!("Skill{capacity}")));

    // Column-major placement: rows go down first, then the next column starts at the top
    assert_eq!(skill_positions[0][1], skill_positions[SKILLS_PER_COLUMN][1]);
    assert!(skill_positions[SKILLS_PER_COLUMN][0] > skill_positions[0][0]);
    assert_eq!(skill_positions[1][0], skill_positions[0][0]);
    assert_eq!(skill_positions[1][1] - skill_positions[0][1], 5.0);
}

#[test]
fn a_long_section_pushes_the_next_heading_onto_a_new_page() {
    let achievements: Vec<String> = (0..40).map(|index| format!("Achievement {index}")).collect();
    let work_experience = json!({
        "jobTitle": "Engineer",
        "company": "Acme",
        "achievements": achievements
    });
    let document = compose(
        json!({ "workExperience": [work_experience], "skills": ["Rust"] }),
        "modern",
    );

    assert_eq!(document.page_count(), 2);
    let first_page: Vec<String> = page_texts(&document, 0)
        .into_iter()
        .map(|(text, _)| text)
        .collect();
    let second_page = page_texts(&document, 1);

    assert!(first_page.contains(&"Achievement 39".to_string()));
    assert!(!first_page.contains(&"Skills".to_string()));
    assert!(first_page.contains(&"Page 1 of 2".to_string()));

    let (_, skills_heading) = second_page.iter().find(|(text, _)| text == "Skills").unwrap();
    let configuration = RenderConfiguration::default();
    assert!(skills_heading[1] < configuration.margins.top + 10.0);
    assert!(second_page.iter().any(|(text, _)| text == "Page 2 of 2"));
}

#[test]
fn references_break_earlier_than_other_sections() {
    // Enough languages to put the cursor between the two thresholds
    let languages: Vec<String> = (0..34).map(|index| format!("Language {index}")).collect();
    let languages: Vec<serde_json::Value> = languages
        .into_iter()
        .map(|name| json!({ "name": name }))
        .collect();
    let document = compose(
        json!({
            "languages": languages,
            "references": [{ "name": "Grace Hopper" }],
        }),
        "modern",
    );

    assert_eq!(document.page_count(), 2);
    assert!(page_texts(&document, 1)
        .iter()
        .any(|(text, _)| text == "References"));
}

#[test]
fn hobbies_as_text_and_as_list_render_identically() {
    let from_text = compose(json!({ "hobbies": "Chess, Hiking; Piano" }), "creative");
    let from_list = compose(json!({ "hobbies": ["Chess", "Hiking", "Piano"] }), "creative");

    similar_asserts::assert_eq!(from_text, from_list);
}

#[test]
fn aliases_of_the_work_experience_key_are_reconciled() {
    let canonical = compose(
        json!({ "workExperiences": [{ "jobTitle": "Engineer", "company": "Acme" }] }),
        "modern",
    );
    let both = compose(
        json!({
            "workExperiences": [{ "jobTitle": "Engineer", "company": "Acme" }],
            "workExperience": [{ "jobTitle": "Ignored", "company": "Elsewhere" }],
        }),
        "modern",
    );

    similar_asserts::assert_eq!(canonical.operations, both.operations);
}

#[test]
fn unknown_templates_are_reported() {
    let error = compose_resume(
        &Resume::default(),
        "does-not-exist",
        &BuiltinTemplates::new(),
        &RenderConfiguration::default(),
    )
    .unwrap_err();

    assert_eq!(error.kind, ErrorKind::TemplateNotFound);
    assert_eq!(error.to_string(), "Template \"does-not-exist\" not found");
}

#[test]
fn every_page_starts_with_a_page_marker() {
    let record: serde_json::Value =
        serde_json::from_str(include_str!("fixtures/complete_resume.json")).unwrap();
    let document = compose(record, "executive");

    let markers = document
        .operations
        .iter()
        .filter(|operation| matches!(operation, Operation::AppendNewPage { .. }))
        .count();
    assert!(matches!(
        document.operations.first(),
        Some(Operation::AppendNewPage {
            page_width,
            page_height
        }) if *page_width == 210.0 && *page_height == 297.0
    ));
    assert_eq!(markers, document.page_count());
}

#[test]
fn boolean_text_fields_are_not_rendered() {
    let document = compose(
        json!({
            "personalInfo": { "email": false, "firstName": true },
            "skills": [{ "name": true }],
            "references": [{ "name": false }],
        }),
        "modern",
    );
    let texts = all_texts(&document);

    assert!(!texts
        .iter()
        .any(|text| text.contains("true") || text.contains("false")));
    assert!(!texts.contains(&"Skills".to_string()));
    assert!(!texts.contains(&"References".to_string()));
    assert_eq!(document.title, "Curriculum Vitae");
}

#[test]
fn a_very_long_skill_is_truncated_to_its_column() {
    let long_name = "Kubernetes".repeat(20_000);
    let started = std::time::Instant::now();
    let document = compose(json!({ "skills": [long_name, "Rust"] }), "modern");
    assert!(started.elapsed() < std::time::Duration::from_secs(1));

    let texts = all_texts(&document);
    let label = texts
        .iter()
        .find(|text| text.starts_with("Kubernetes"))
        .unwrap();
    assert!(label.ends_with('…'));
    assert!(label.len() < 200);
    assert!(texts.contains(&"Rust".to_string()));
}
