// ==============================================================================
// assembler.rs - Report Assembler
// ==============================================================================
// Description: Joins a title and ordered section texts into one document
// Author: Matt Barham
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

/// Separator placed between the title and each section
pub const SECTION_SEPARATOR: &str = "\n\n";

/// Concatenate title and sections in the given order
///
/// Section text is inserted verbatim; nothing is reordered or reformatted.
pub fn assemble<S: AsRef<str>>(title: &str, sections: &[S]) -> String {
    let capacity = title.len()
        + sections
            .iter()
            .map(|s| s.as_ref().len() + SECTION_SEPARATOR.len())
            .sum::<usize>();

    let mut document = String::with_capacity(capacity);
    document.push_str(title);
    for section in sections {
        document.push_str(SECTION_SEPARATOR);
        document.push_str(section.as_ref());
    }
    document
}
