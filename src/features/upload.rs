//! The "add recipe" window: its form, reading the submitted entries, and opening and closing the overlay.
//!
//! After a successful upload the window shows a message.
//! Callers hide it again after [`Config::close_delay`] with [`View::hide_window`].

use super::recipe::{Ingredient, Recipe};
use crate::{
	config::Config,
	events::{EventKind, Handlers, SubscriptionId},
	host::{self, Host},
	markup::escape,
	view::{Markup, Overlay, View, ViewConfig},
	ProducerError,
};
use core::{fmt::Write as _, hash::Hash};
use tracing::{error, trace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
	pub label: String,
	pub name: String,
	pub input_type: &'static str,
	pub value: String,
	pub placeholder: Option<String>,
	pub required: bool,
}

impl Field {
	fn new(label: &str, name: &str, input_type: &'static str, required: bool) -> Self {
		Self {
			label: label.to_owned(),
			name: name.to_owned(),
			input_type,
			value: String::new(),
			placeholder: None,
			required,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
	pub recipe: Vec<Field>,
	pub ingredients: Vec<Field>,
}

/// Number of ingredient rows in a fresh form.
pub const INGREDIENT_ROWS: usize = 6;

impl Default for UploadForm {
	fn default() -> Self {
		Self {
			recipe: vec![
				Field::new("Title", "title", "text", true),
				Field::new("URL", "sourceUrl", "text", true),
				Field::new("Image URL", "image", "text", true),
				Field::new("Publisher", "publisher", "text", true),
				Field::new("Prep time", "cookingTime", "number", true),
				Field::new("Servings", "servings", "number", true),
			],
			ingredients: (1..=INGREDIENT_ROWS)
				.map(|i| Field {
					placeholder: Some("Format: 'Quantity,Unit,Description'".to_owned()),
					..Field::new(&format!("Ingredient {}", i), &format!("ingredient-{}", i), "text", i == 1)
				})
				.collect(),
		}
	}
}

#[derive(Debug, Clone)]
pub struct UploadMarkup {
	icons: String,
}

impl UploadMarkup {
	#[must_use]
	pub fn new(config: &Config) -> Self {
		Self { icons: config.icons.clone() }
	}
}

fn column(heading: &str, fields: &[Field], markup: &mut String) {
	let _ = write!(markup, "<div class=\"upload__column\"><h3 class=\"upload__heading\">{}</h3>", escape(heading));
	for field in fields {
		let _ = write!(
			markup,
			"<label>{}</label><input name=\"{}\" type=\"{}\" value=\"{}\"",
			escape(&field.label),
			escape(&field.name),
			field.input_type,
			escape(&field.value),
		);
		if let Some(placeholder) = &field.placeholder {
			let _ = write!(markup, " placeholder=\"{}\"", escape(placeholder));
		}
		if field.required {
			markup.push_str(" required");
		}
		markup.push_str(" />");
	}
	markup.push_str("</div>");
}

impl Markup for UploadMarkup {
	type Data = UploadForm;

	fn markup(&self, form: &UploadForm) -> Result<String, ProducerError> {
		let mut markup = String::new();
		column("Recipe data", &form.recipe, &mut markup);
		column("Ingredients", &form.ingredients, &mut markup);
		let _ = write!(
			markup,
			"<button class=\"btn upload__btn\"><svg><use href=\"{}#icon-upload-cloud\"></use></svg><span>Upload</span></button>",
			escape(&self.icons),
		);
		Ok(markup)
	}
}

/// The upload view, rendering into the `form` inside `window`.
#[must_use]
pub fn view<H: Host>(form: H::Node, window: H::Node, backdrop: H::Node, config: &Config) -> View<UploadMarkup, H> {
	let texts = ViewConfig {
		message: "Recipe was successfully uploaded :)".to_owned(),
		..ViewConfig::default()
	};
	View::new(form, UploadMarkup::new(config), texts.with_icons(config)).with_overlay(window, backdrop)
}

/// The `name`/`value` pairs of all named inputs below `form`, in document order.
#[must_use]
pub fn form_entries<H: Host + ?Sized>(host: &H, form: &H::Node) -> Vec<(String, String)> {
	host::find_all_by_name(host, form, "input")
		.into_iter()
		.filter_map(|input| {
			let name = host.attribute(&input, "name")?;
			Some((name, host.attribute(&input, "value").unwrap_or_default()))
		})
		.collect()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
	#[error("Wrong ingredient format! Please use the correct format :)")]
	IngredientFormat(String),

	#[error("Missing {0}.")]
	MissingField(&'static str),

	#[error("{field} must be a whole number, not {value:?}.")]
	NotANumber { field: &'static str, value: String },
}

/// Builds a user-generated recipe from submitted [`form_entries`].
///
/// Ingredient entries are named `ingredient-…` and hold `quantity,unit,description`. Blank ones are skipped.
///
/// # Errors
///
/// Iff a recipe field is missing or malformed, or an ingredient doesn't have exactly three parts with a numeric or empty quantity.
pub fn parse_upload(entries: &[(String, String)]) -> Result<Recipe, UploadError> {
	let get = |field: &'static str| -> Result<String, UploadError> {
		entries.iter().find(|(name, _)| name == field).map(|(_, value)| value.trim().to_owned()).ok_or(UploadError::MissingField(field))
	};
	let number = |field: &'static str| -> Result<u32, UploadError> {
		let value = get(field)?;
		value.parse().map_err(|_| UploadError::NotANumber { field, value })
	};

	let mut ingredients = Vec::new();
	for (_, value) in entries.iter().filter(|(name, _)| name.starts_with("ingredient")) {
		if value.trim().is_empty() {
			continue;
		}
		let parts: Vec<&str> = value.split(',').map(str::trim).collect();
		let (quantity, unit, description) = match parts[..] {
			[quantity, unit, description] => (quantity, unit, description),
			_ => return Err(UploadError::IngredientFormat(value.clone())),
		};
		let quantity = if quantity.is_empty() {
			None
		} else {
			Some(quantity.parse::<f64>().map_err(|_| UploadError::IngredientFormat(value.clone()))?)
		};
		ingredients.push(Ingredient {
			quantity,
			unit: unit.to_owned(),
			description: description.to_owned(),
		});
	}
	trace!("Parsed {} ingredient(s).", ingredients.len());

	Ok(Recipe {
		id: String::new(),
		title: get("title")?,
		publisher: get("publisher")?,
		source_url: get("sourceUrl")?,
		image: get("image")?,
		servings: number("servings")?,
		cooking_time: number("cookingTime")?,
		ingredients,
		bookmarked: true,
		user_generated: true,
	})
}

/// Calls `handler` with the form's entries whenever `form` is submitted.
pub fn add_handler_upload<H>(handlers: &mut Handlers<H>, form: H::Node, mut handler: impl FnMut(&mut H, Vec<(String, String)>) + 'static) -> SubscriptionId
where
	H: Host,
	H::Node: Hash + Eq + 'static,
{
	handlers.subscribe(form.clone(), EventKind::Submit, move |host, _| {
		let entries = form_entries(host, &form);
		handler(host, entries);
	})
}

/// Toggles `overlay` whenever one of `triggers` is clicked, typically the open and close buttons and the backdrop.
pub fn add_handler_toggle_window<H>(handlers: &mut Handlers<H>, overlay: &Overlay<H::Node>, triggers: impl IntoIterator<Item = H::Node>) -> Vec<SubscriptionId>
where
	H: Host,
	H::Node: Hash + Eq + 'static,
{
	triggers
		.into_iter()
		.map(|trigger| {
			let overlay = overlay.clone();
			handlers.subscribe(trigger, EventKind::Click, move |host, _| {
				if let Err(e) = overlay.toggle(host) {
					error!("Could not toggle the window: {}", e);
				}
			})
		})
		.collect()
}
