//! # Form Fill Engine
//!
//! Fills the interactive form (AcroForm) of a PDF template and writes the
//! result next to it as `{stem}_auto.pdf`. The template itself is never
//! touched.
//!
//! ## Workflow
//!
//! 1.  **Open**: the template is loaded; a missing file is
//!     [`DocumentError::TemplateNotFound`]. A PDF without `/AcroForm` is
//!     returned unchanged and nothing is written.
//!
//! 2.  **Field directory**: the field tree is walked from `/Fields`, building
//!     fully qualified names (`parent.child`) and remembering each field's
//!     (possibly inherited) `/FT` and its widget annotations.
//!
//! 3.  **Assign**: for each requested name present in the directory the
//!     read-only bit of `/Ff` is cleared and `/V` is set. Text and choice
//!     fields get a PDF text string and lose their stale `/AP` so the viewer
//!     draws the new value. Button fields get a name value and their widgets'
//!     `/AS` is switched to the matching appearance state.
//!
//! 4.  **Persist**: `/NeedAppearances true` is set on the form and the
//!     document is saved as the `_auto` copy.
//!
//! Unknown names are skipped and a field that cannot be assigned is logged;
//! neither fails the fill.
//!
//! All work here is blocking; async callers go through `spawn_blocking`.

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::documents::naming;
use crate::error::DocumentError;

/// Field name → value to assign.
pub type FormFieldMap = BTreeMap<String, String>;

/// Read-only flag in a field's `/Ff` bit set.
const READ_ONLY: i64 = 1;

/// Nesting limit of the field tree, guards against malformed files.
const MAX_FIELD_DEPTH: usize = 32;

/// Fills PDF forms. Implementations are interchangeable PDF backends.
pub trait FormFiller: Send + Sync {
    /// Writes a filled copy of `template` and returns its path, or returns
    /// `template` itself when it carries no form.
    fn fill(&self, template: &Path, values: &FormFieldMap) -> Result<PathBuf, DocumentError>;
}

/// [`FormFiller`] backed by `lopdf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfFormFiller;

impl FormFiller for LopdfFormFiller {
    fn fill(&self, template: &Path, values: &FormFieldMap) -> Result<PathBuf, DocumentError> {
        if !template.is_file() {
            return Err(DocumentError::TemplateNotFound(template.to_path_buf()));
        }

        let mut doc = Document::load(template)?;
        let Some(form) = locate_form(&doc)? else {
            log::debug!("{} has no interactive form, nothing to fill", template.display());
            return Ok(template.to_path_buf());
        };

        let fields = field_directory(&doc, form)?;
        log::debug!(
            "Form fields of {}: {:?}",
            template.display(),
            fields.keys().collect::<Vec<_>>()
        );

        for (name, value) in values {
            let Some(field) = fields.get(name) else {
                log::debug!("No field named {} in {}", name, template.display());
                continue;
            };
            if let Err(e) = assign(&mut doc, field, value) {
                log::error!("Failed to fill field {}: {}", name, e);
            }
        }

        form_dict_mut(&mut doc, form)?.set("NeedAppearances", Object::Boolean(true));

        let file_name = template
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let output = template.with_file_name(naming::auto_fill_name(file_name));
        doc.save(&output)?;
        log::info!("Filled form written to {}", output.display());
        Ok(output)
    }
}

/// Fully qualified names of every field of the form at `path`.
#[cfg(test)]
pub(crate) fn field_names(path: &Path) -> Result<Vec<String>, DocumentError> {
    let doc = load_existing(path)?;
    match locate_form(&doc)? {
        Some(form) => Ok(field_directory(&doc, form)?.into_keys().collect()),
        None => Ok(Vec::new()),
    }
}

/// Current value of field `name`, `None` when the field is missing or unset.
#[cfg(test)]
pub(crate) fn field_value(path: &Path, name: &str) -> Result<Option<String>, DocumentError> {
    let doc = load_existing(path)?;
    let Some(form) = locate_form(&doc)? else {
        return Ok(None);
    };
    let fields = field_directory(&doc, form)?;
    let Some(field) = fields.get(name) else {
        return Ok(None);
    };
    let dict = doc.get_dictionary(field.id)?;
    Ok(match dict.get(b"V") {
        Ok(Object::String(bytes, _)) => Some(decode_text(bytes)),
        Ok(Object::Name(state)) => Some(String::from_utf8_lossy(state).into_owned()),
        _ => None,
    })
}

#[cfg(test)]
fn load_existing(path: &Path) -> Result<Document, DocumentError> {
    if !path.is_file() {
        return Err(DocumentError::TemplateNotFound(path.to_path_buf()));
    }
    Ok(Document::load(path)?)
}

/// Where the `/AcroForm` dictionary lives.
#[derive(Debug, Clone, Copy)]
enum FormLocation {
    /// An indirect object of its own.
    Object(ObjectId),
    /// Inline in the catalog with this id.
    InCatalog(ObjectId),
}

fn locate_form(doc: &Document) -> Result<Option<FormLocation>, DocumentError> {
    let root = doc.trailer.get(b"Root")?.as_reference()?;
    let catalog = doc.get_dictionary(root)?;
    Ok(match catalog.get(b"AcroForm") {
        Ok(Object::Reference(id)) => Some(FormLocation::Object(*id)),
        Ok(Object::Dictionary(_)) => Some(FormLocation::InCatalog(root)),
        _ => None,
    })
}

fn form_dict(doc: &Document, form: FormLocation) -> Result<&Dictionary, DocumentError> {
    Ok(match form {
        FormLocation::Object(id) => doc.get_dictionary(id)?,
        FormLocation::InCatalog(root) => doc.get_dictionary(root)?.get(b"AcroForm")?.as_dict()?,
    })
}

fn form_dict_mut(doc: &mut Document, form: FormLocation) -> Result<&mut Dictionary, DocumentError> {
    Ok(match form {
        FormLocation::Object(id) => doc.get_dictionary_mut(id)?,
        FormLocation::InCatalog(root) => doc
            .get_dictionary_mut(root)?
            .get_mut(b"AcroForm")?
            .as_dict_mut()?,
    })
}

/// A named node of the field tree.
#[derive(Debug, Clone)]
struct FieldEntry {
    id: ObjectId,
    /// `/FT`, inherited from the parent when absent.
    field_type: Option<Vec<u8>>,
    /// Widget annotations drawing this field; the field itself when merged.
    widgets: Vec<ObjectId>,
}

fn field_directory(
    doc: &Document,
    form: FormLocation,
) -> Result<BTreeMap<String, FieldEntry>, DocumentError> {
    let mut directory = BTreeMap::new();
    let mut visited = HashSet::new();
    let roots = match form_dict(doc, form)?.get(b"Fields") {
        Ok(Object::Array(items)) => items.clone(),
        Ok(Object::Reference(id)) => doc.get_object(*id)?.as_array()?.clone(),
        _ => Vec::new(),
    };
    for item in &roots {
        if let Object::Reference(id) = item {
            walk_field(doc, *id, "", None, 0, &mut visited, &mut directory);
        }
    }
    Ok(directory)
}

fn walk_field(
    doc: &Document,
    id: ObjectId,
    parent_name: &str,
    inherited_type: Option<&[u8]>,
    depth: usize,
    visited: &mut HashSet<ObjectId>,
    directory: &mut BTreeMap<String, FieldEntry>,
) {
    if depth > MAX_FIELD_DEPTH || !visited.insert(id) {
        return;
    }
    let Ok(dict) = doc.get_dictionary(id) else {
        return;
    };

    let partial = match dict.get(b"T") {
        Ok(Object::String(bytes, _)) => Some(decode_text(bytes)),
        _ => None,
    };
    let full_name = match (&partial, parent_name.is_empty()) {
        (Some(t), true) => t.clone(),
        (Some(t), false) => format!("{}.{}", parent_name, t),
        (None, _) => parent_name.to_string(),
    };
    let field_type = match dict.get(b"FT") {
        Ok(Object::Name(ft)) => Some(ft.clone()),
        _ => inherited_type.map(<[u8]>::to_vec),
    };

    let kids: Vec<ObjectId> = match dict.get(b"Kids") {
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|k| k.as_reference().ok())
            .collect(),
        _ => Vec::new(),
    };

    let mut widgets = Vec::new();
    if is_widget(dict) {
        widgets.push(id);
    }
    for kid in &kids {
        let Ok(kid_dict) = doc.get_dictionary(*kid) else {
            continue;
        };
        if kid_dict.has(b"T") {
            walk_field(
                doc,
                *kid,
                &full_name,
                field_type.as_deref(),
                depth + 1,
                visited,
                directory,
            );
        } else {
            widgets.push(*kid);
        }
    }

    if partial.is_some() {
        directory.insert(
            full_name,
            FieldEntry {
                id,
                field_type,
                widgets,
            },
        );
    }
}

fn is_widget(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Subtype"), Ok(Object::Name(n)) if n.as_slice() == b"Widget")
}

fn assign(doc: &mut Document, field: &FieldEntry, value: &str) -> Result<(), DocumentError> {
    let dict = doc.get_dictionary_mut(field.id)?;
    let flags = dict.get(b"Ff").and_then(Object::as_i64).unwrap_or(0);
    if flags & READ_ONLY != 0 {
        dict.set("Ff", Object::Integer(flags & !READ_ONLY));
    }

    if field.field_type.as_deref() == Some(b"Btn".as_slice()) {
        dict.set("V", Object::Name(value.as_bytes().to_vec()));
        for widget in &field.widgets {
            let widget = doc.get_dictionary_mut(*widget)?;
            let state = if has_appearance_state(widget, value) || !widget.has(b"AP") {
                value.as_bytes().to_vec()
            } else {
                b"Off".to_vec()
            };
            widget.set("AS", Object::Name(state));
        }
        return Ok(());
    }

    dict.set("V", encode_text(value));
    dict.remove(b"AP");
    for widget in &field.widgets {
        doc.get_dictionary_mut(*widget)?.remove(b"AP");
    }
    Ok(())
}

/// Whether a button widget has an "on" appearance called `state`.
fn has_appearance_state(widget: &Dictionary, state: &str) -> bool {
    widget
        .get(b"AP")
        .and_then(Object::as_dict)
        .and_then(|ap| ap.get(b"N"))
        .and_then(Object::as_dict)
        .map(|normal| normal.has(state.as_bytes()))
        .unwrap_or(false)
}

/// PDF text string: literal for ASCII, UTF-16BE with byte order mark otherwise.
fn encode_text(value: &str) -> Object {
    if value.is_ascii() {
        return Object::string_literal(value);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn decode_text(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
pub(crate) mod test_pdf {
    //! Builders for small PDFs used across the test suites.

    use lopdf::{dictionary, Document, Object, ObjectId};
    use std::path::Path;

    fn skeleton() -> (Document, ObjectId, ObjectId) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => Object::Integer(1),
            }),
        );
        (doc, pages_id, page_id)
    }

    /// A one-page PDF without a form.
    pub fn plain(path: &Path) {
        let (mut doc, pages_id, _) = skeleton();
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    /// A one-page PDF whose form holds the given `(name, type, flags)`
    /// fields. Button fields get an `On` appearance state.
    pub fn with_fields(path: &Path, fields: &[(&str, &str, i64)]) {
        let (mut doc, pages_id, page_id) = skeleton();
        let mut refs = Vec::new();
        for (name, field_type, flags) in fields {
            let mut field = dictionary! {
                "Type" => "Annot",
                "Subtype" => "Widget",
                "FT" => Object::Name(field_type.as_bytes().to_vec()),
                "T" => Object::string_literal(*name),
                "Ff" => Object::Integer(*flags),
                "P" => page_id,
                "Rect" => vec![
                    Object::Integer(50),
                    Object::Integer(700),
                    Object::Integer(250),
                    Object::Integer(720),
                ],
            };
            if *field_type == "Btn" {
                field.set("V", Object::Name(b"Off".to_vec()));
                field.set("AS", Object::Name(b"Off".to_vec()));
                field.set(
                    "AP",
                    dictionary! { "N" => dictionary! { "On" => dictionary! {}, "Off" => dictionary! {} } },
                );
            } else {
                field.set("V", Object::string_literal(""));
                field.set("AP", dictionary! { "N" => dictionary! {} });
            }
            refs.push(Object::Reference(doc.add_object(field)));
        }
        let form_id = doc.add_object(dictionary! { "Fields" => refs });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
            "AcroForm" => form_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }
}
