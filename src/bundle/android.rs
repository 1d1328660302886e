//! Android `strings.xml` resource writer.

use std::fmt::Write as _;

use super::grouping::{
    Entry,
    GroupedEntry,
};

/// XML prolog and opening `resources` element.
const HEADER: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
    "<resources xmlns:xliff=\"urn:oasis:names:tc:xliff:document:1.2\">\n",
);

/// Closing `resources` element.
const FOOTER: &str = "</resources>\n";

/// Render the resource file of one locale. Values are written verbatim.
#[must_use]
pub fn render(entries: &[GroupedEntry]) -> String {
    let mut xml = String::from(HEADER);

    // Writing into a String cannot fail.
    for GroupedEntry { name, entry } in entries {
        match entry {
            Entry::Scalar(value) => {
                let _ = writeln!(xml, "    <string name=\"{name}\">{value}</string>");
            }
            Entry::Array(items) => {
                let _ = writeln!(xml, "<string-array name=\"{name}\">");
                for (index, value) in items {
                    let _ = writeln!(xml, "    <item name=\"{name}{index}\">{value}</item>");
                }
                xml.push_str("</string-array>\n");
            }
            Entry::Plural { one, many } => {
                let _ = writeln!(xml, "<plurals name=\"{name}\">");
                let _ = writeln!(xml, "    <item quantity=\"one\">{one}</item>");
                let _ = writeln!(xml, "    <item quantity=\"other\">{many}</item>");
                xml.push_str("</plurals>\n");
            }
        }
    }

    xml.push_str(FOOTER);
    xml
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use googletest::prelude::*;

    use super::*;

    fn entry(name: &str, entry: Entry) -> GroupedEntry {
        GroupedEntry { name: name.to_string(), entry }
    }

    #[googletest::test]
    fn empty_locale_is_header_and_footer() {
        expect_that!(
            render(&[]),
            eq("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<resources xmlns:xliff=\"urn:oasis:names:tc:xliff:document:1.2\">\n</resources>\n")
        );
    }

    #[googletest::test]
    fn renders_every_entry_kind() {
        let entries = [
            entry("greeting", Entry::Scalar("Hello".to_string())),
            entry(
                "items",
                Entry::Array(BTreeMap::from([(0, "A".to_string()), (1, "B".to_string())])),
            ),
            entry(
                "count",
                Entry::Plural { one: "1 item".to_string(), many: "N items".to_string() },
            ),
        ];

        let expected = concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<resources xmlns:xliff=\"urn:oasis:names:tc:xliff:document:1.2\">\n",
            "    <string name=\"greeting\">Hello</string>\n",
            "<string-array name=\"items\">\n",
            "    <item name=\"items0\">A</item>\n",
            "    <item name=\"items1\">B</item>\n",
            "</string-array>\n",
            "<plurals name=\"count\">\n",
            "    <item quantity=\"one\">1 item</item>\n",
            "    <item quantity=\"other\">N items</item>\n",
            "</plurals>\n",
            "</resources>\n",
        );
        expect_that!(render(&entries), eq(expected));
    }

    #[googletest::test]
    fn values_are_not_escaped() {
        let entries = [entry("markup", Entry::Scalar("<b>Tom & Jerry</b>".to_string()))];

        expect_that!(
            render(&entries),
            contains_substring("    <string name=\"markup\"><b>Tom & Jerry</b></string>\n")
        );
    }
}
