//! The recipe detail view: ingredients scaled to the chosen servings, and the bookmark toggle.

use super::closest_data;
use crate::{
	config::Config,
	events::{EventKind, Handlers, SubscriptionId},
	host::{self, Host},
	markup::escape,
	view::{Markup, View, ViewConfig},
	ProducerError,
};
use core::{fmt::Write as _, hash::Hash};
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq)]
pub struct Ingredient {
	pub quantity: Option<f64>,
	pub unit: String,
	pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
	pub id: String,
	pub title: String,
	pub publisher: String,
	pub source_url: String,
	pub image: String,
	pub servings: u32,
	/// Minutes.
	pub cooking_time: u32,
	pub ingredients: Vec<Ingredient>,
	pub bookmarked: bool,
	/// Uploaded by the current user.
	pub user_generated: bool,
}

impl Recipe {
	/// Scales every ingredient quantity from the current servings to `servings`.
	pub fn update_servings(&mut self, servings: u32) {
		if self.servings != 0 {
			let factor = f64::from(servings) / f64::from(self.servings);
			for quantity in self.ingredients.iter_mut().filter_map(|i| i.quantity.as_mut()) {
				*quantity *= factor;
			}
		}
		self.servings = servings;
	}
}

const EPSILON: f64 = 1e-3;

/// Formats an ingredient quantity as a mixed fraction where a small one fits, like `1 1/2` or `1/3`.
/// Other quantities get at most two decimals. Missing, zero and non-finite quantities are blank.
#[must_use]
pub fn format_quantity(quantity: Option<f64>) -> String {
	let quantity = match quantity {
		Some(quantity) if quantity.is_finite() && quantity > 0.0 => quantity,
		_ => return String::new(),
	};

	let rounded = quantity.round();
	if (quantity - rounded).abs() < EPSILON {
		return format!("{}", rounded);
	}

	let whole = quantity.trunc();
	let rest = quantity - whole;
	for denominator in 2..=16_u8 {
		let denominator = f64::from(denominator);
		let numerator = (rest * denominator).round();
		if numerator >= 1.0 && numerator < denominator && (numerator / denominator - rest).abs() < EPSILON {
			return if whole < 1.0 {
				format!("{}/{}", numerator, denominator)
			} else {
				format!("{} {}/{}", whole, numerator, denominator)
			};
		}
	}

	let decimal = format!("{:.2}", quantity);
	decimal.trim_end_matches('0').trim_end_matches('.').to_owned()
}

#[derive(Debug, Clone)]
pub struct RecipeMarkup {
	icons: String,
}

impl RecipeMarkup {
	#[must_use]
	pub fn new(config: &Config) -> Self {
		Self { icons: config.icons.clone() }
	}

	fn ingredient(&self, ingredient: &Ingredient, markup: &mut String) {
		let _ = write!(
			markup,
			concat!(
				"<li class=\"recipe__ingredient\">",
				"<svg class=\"recipe__icon\"><use href=\"{icons}#icon-check\"></use></svg>",
				"<div class=\"recipe__quantity\">{quantity}</div>",
				"<div class=\"recipe__description\"><span class=\"recipe__unit\">{unit}</span> {description}</div>",
				"</li>",
			),
			icons = escape(&self.icons),
			quantity = format_quantity(ingredient.quantity),
			unit = escape(&ingredient.unit),
			description = escape(&ingredient.description),
		);
	}
}

impl Markup for RecipeMarkup {
	type Data = Recipe;

	fn markup(&self, recipe: &Recipe) -> Result<String, ProducerError> {
		trace!(servings = recipe.servings, ingredients = recipe.ingredients.len(), bookmarked = recipe.bookmarked);
		let icons = escape(&self.icons);
		let title = escape(&recipe.title);
		let mut markup = String::new();

		let _ = write!(
			markup,
			concat!(
				"<figure class=\"recipe__fig\">",
				"<img src=\"{image}\" alt=\"{title}\" class=\"recipe__img\" />",
				"<h1 class=\"recipe__title\"><span>{title}</span></h1>",
				"</figure>",
				"<div class=\"recipe__details\">",
				"<div class=\"recipe__info\">",
				"<svg class=\"recipe__info-icon\"><use href=\"{icons}#icon-clock\"></use></svg>",
				"<span class=\"recipe__info-data recipe__info-data--minutes\">{cooking_time}</span>",
				"<span class=\"recipe__info-text\">minutes</span>",
				"</div>",
				"<div class=\"recipe__info\">",
				"<svg class=\"recipe__info-icon\"><use href=\"{icons}#icon-users\"></use></svg>",
				"<span class=\"recipe__info-data recipe__info-data--people\">{servings}</span>",
				"<span class=\"recipe__info-text\">servings</span>",
				"<div class=\"recipe__info-buttons\">",
				"<button class=\"btn--tiny btn--update-servings\" data-update-to=\"{fewer}\">",
				"<svg><use href=\"{icons}#icon-minus-circle\"></use></svg>",
				"</button>",
				"<button class=\"btn--tiny btn--update-servings\" data-update-to=\"{more}\">",
				"<svg><use href=\"{icons}#icon-plus-circle\"></use></svg>",
				"</button>",
				"</div>",
				"</div>",
				"<div class=\"{user_class}\"><svg><use href=\"{icons}#icon-user\"></use></svg></div>",
				"<button class=\"btn--round btn--bookmark\">",
				"<svg><use href=\"{icons}#icon-bookmark{fill}\"></use></svg>",
				"</button>",
				"</div>",
				"<div class=\"recipe__ingredients\">",
				"<h2 class=\"heading--2\">Recipe ingredients</h2>",
				"<ul class=\"recipe__ingredient-list\">",
			),
			image = escape(&recipe.image),
			title = title,
			icons = icons,
			cooking_time = recipe.cooking_time,
			servings = recipe.servings,
			fewer = recipe.servings.saturating_sub(1),
			more = recipe.servings.saturating_add(1),
			user_class = if recipe.user_generated { "recipe__user-generated" } else { "recipe__user-generated hidden" },
			fill = if recipe.bookmarked { "-fill" } else { "" },
		);

		for ingredient in &recipe.ingredients {
			self.ingredient(ingredient, &mut markup);
		}

		let _ = write!(
			markup,
			concat!(
				"</ul>",
				"</div>",
				"<div class=\"recipe__directions\">",
				"<h2 class=\"heading--2\">How to cook it</h2>",
				"<p class=\"recipe__directions-text\">This recipe was carefully designed and tested by ",
				"<span class=\"recipe__publisher\">{publisher}</span>. Please check out directions at their website.</p>",
				"<a class=\"btn--small recipe__btn\" href=\"{source_url}\" target=\"_blank\">",
				"<span>Directions</span>",
				"<svg class=\"search__icon\"><use href=\"{icons}#icon-arrow-right\"></use></svg>",
				"</a>",
				"</div>",
			),
			publisher = escape(&recipe.publisher),
			source_url = escape(&recipe.source_url),
			icons = icons,
		);
		Ok(markup)
	}
}

#[must_use]
pub fn view<H: Host>(mount: H::Node, config: &Config) -> View<RecipeMarkup, H> {
	View::new(
		mount,
		RecipeMarkup::new(config),
		ViewConfig::new("We could not find that recipe. Please try another one!", "").with_icons(config),
	)
}

/// The servings a click on `target` asks for, if it hit a servings button below `mount`.
///
/// Requests for fewer than one serving are refused.
#[must_use]
pub fn update_servings_to<H: Host + ?Sized>(host: &H, mount: &H::Node, target: &H::Node) -> Option<u32> {
	let servings: u32 = closest_data(host, target, "btn--update-servings", mount, "data-update-to")?;
	if servings < 1 {
		debug!("Refusing to go below one serving.");
		return None;
	}
	Some(servings)
}

/// Whether a click on `target` hit the bookmark button below `mount`.
#[must_use]
pub fn is_bookmark_click<H: Host + ?Sized>(host: &H, mount: &H::Node, target: &H::Node) -> bool {
	host::closest(host, target, "btn--bookmark", mount).is_some()
}

/// Calls `handler` when the page loads and whenever the location hash changes, both dispatched at `root`.
pub fn add_handler_render<H>(handlers: &mut Handlers<H>, root: &H::Node, handler: impl FnMut(&mut H) + Clone + 'static) -> [SubscriptionId; 2]
where
	H: Host,
	H::Node: Hash + Eq + 'static,
{
	[EventKind::HashChange, EventKind::Load].map(|kind| {
		let mut handler = handler.clone();
		handlers.subscribe(root.clone(), kind, move |host, _| handler(host))
	})
}

/// Calls `handler` with the requested servings whenever a servings button below `mount` is clicked.
pub fn add_handler_update_servings<H>(handlers: &mut Handlers<H>, mount: H::Node, mut handler: impl FnMut(&mut H, u32) + 'static) -> SubscriptionId
where
	H: Host,
	H::Node: Hash + Eq + 'static,
{
	handlers.subscribe(mount.clone(), EventKind::Click, move |host, event| {
		if let Some(servings) = update_servings_to(host, &mount, &event.target) {
			handler(host, servings);
		}
	})
}

/// Calls `handler` whenever the bookmark button below `mount` is clicked.
pub fn add_handler_add_bookmark<H>(handlers: &mut Handlers<H>, mount: H::Node, mut handler: impl FnMut(&mut H) + 'static) -> SubscriptionId
where
	H: Host,
	H::Node: Hash + Eq + 'static,
{
	handlers.subscribe(mount.clone(), EventKind::Click, move |host, event| {
		if is_bookmark_click(host, &mount, &event.target) {
			handler(host);
		}
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn quantities_read_like_a_cookbook() {
		assert_eq!(format_quantity(None), "");
		assert_eq!(format_quantity(Some(0.0)), "");
		assert_eq!(format_quantity(Some(2.0)), "2");
		assert_eq!(format_quantity(Some(0.5)), "1/2");
		assert_eq!(format_quantity(Some(1.5)), "1 1/2");
		assert_eq!(format_quantity(Some(1.0 / 3.0)), "1/3");
		assert_eq!(format_quantity(Some(2.75)), "2 3/4");
		assert_eq!(format_quantity(Some(0.123)), "0.12");
	}

	#[test]
	fn servings_scale_quantities() {
		let mut recipe = Recipe {
			id: "r".to_owned(),
			title: "Soup".to_owned(),
			publisher: String::new(),
			source_url: String::new(),
			image: String::new(),
			servings: 4,
			cooking_time: 30,
			ingredients: vec![
				Ingredient {
					quantity: Some(2.0),
					unit: "cups".to_owned(),
					description: "water".to_owned(),
				},
				Ingredient {
					quantity: None,
					unit: String::new(),
					description: "salt".to_owned(),
				},
			],
			bookmarked: false,
			user_generated: false,
		};
		recipe.update_servings(6);
		assert_eq!(recipe.servings, 6);
		assert_eq!(recipe.ingredients[0].quantity, Some(3.0));
		assert_eq!(recipe.ingredients[1].quantity, None);
	}
}
