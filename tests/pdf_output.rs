use cvpress::{
    configuration::RenderConfiguration, fonts::encode_win_ansi, record::ResumeRecord, render_pdf,
};

fn complete_record() -> ResumeRecord {
    ResumeRecord::from_json_str(include_str!("fixtures/complete_resume.json")).unwrap()
}

/// The strings shown with `Tj` on every page, in drawing order.
fn shown_strings(pdf_document: &lopdf::Document) -> Vec<Vec<Vec<u8>>> {
    pdf_document
        .get_pages()
        .into_values()
        .map(|page_id| {
            let content = pdf_document.get_page_content(page_id).unwrap();
            lopdf::content::Content::decode(&content)
                .unwrap()
                .operations
                .into_iter()
                .filter(|operation| operation.operator == "Tj")
                .filter_map(|operation| match operation.operands.first() {
                    Some(lopdf::Object::String(bytes, _)) => Some(bytes.clone()),
                    _ => None,
                })
                .collect()
        })
        .collect()
}

#[test]
fn rendered_resume_is_a_valid_pdf() {
    let bytes = render_pdf(&complete_record(), "modern", &RenderConfiguration::default()).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));

    let pdf_document = lopdf::Document::load_mem(&bytes).unwrap();
    let pages = shown_strings(&pdf_document);
    assert_eq!(pages.len(), 2);

    let page_count = pages.len();
    for (page_index, strings) in pages.iter().enumerate() {
        let footer = encode_win_ansi(&format!("Page {} of {}", page_index + 1, page_count));
        assert!(strings.contains(&footer), "page {} has no footer", page_index + 1);
    }
    assert!(pages[0].contains(&encode_win_ansi("Ada Lovelace")));
}

#[test]
fn repeated_renders_are_byte_identical() {
    let record = complete_record();
    let configuration = RenderConfiguration::default();

    let first = render_pdf(&record, "modern-green", &configuration).unwrap();
    let second = render_pdf(&record, "modern-green", &configuration).unwrap();
    assert!(first == second, "the two renders differ");
}

#[test]
fn identifiers_and_metadata_are_written() {
    let bytes = render_pdf(&complete_record(), "classic", &RenderConfiguration::default()).unwrap();
    let pdf_document = lopdf::Document::load_mem(&bytes).unwrap();

    let identifiers = pdf_document.trailer.get(b"ID").unwrap().as_array().unwrap();
    assert_eq!(identifiers.len(), 2);
    assert_eq!(identifiers[0].as_str().unwrap().len(), 32);

    let info_id = pdf_document
        .trailer
        .get(b"Info")
        .unwrap()
        .as_reference()
        .unwrap();
    let info = pdf_document.get_dictionary(info_id).unwrap();
    assert_eq!(
        info.get(b"Title").unwrap().as_str().unwrap(),
        b"Ada Lovelace - Curriculum Vitae"
    );
    assert_eq!(
        info.get(b"CreationDate").unwrap().as_str().unwrap(),
        b"D:19700101000000+00'00'"
    );
}

#[test]
fn the_template_changes_the_output() {
    let record = complete_record();
    let configuration = RenderConfiguration::default();

    let modern = render_pdf(&record, "modern", &configuration).unwrap();
    let creative = render_pdf(&record, "creative", &configuration).unwrap();
    assert!(modern != creative);
}
