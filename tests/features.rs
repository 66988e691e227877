use recipe_dom::{
	config::Config,
	dom::{Document, NodeId},
	events::{Event, EventKind, Handlers},
	features::{
		preview::{self, Preview, PreviewList},
		recipe::{self, Ingredient, Recipe},
		search,
		upload::{self, UploadForm},
	},
	host::{self, Host},
	view::{MountState, Outcome},
};
use std::{cell::RefCell, rc::Rc};
use tracing::Level;

fn init_logging() {
	let _ = tracing_subscriber::fmt().with_max_level(Level::TRACE).with_test_writer().try_init();
}

fn find(document: &Document, class: &str) -> NodeId {
	host::find_by_class(document, &document.root(), class).unwrap_or_else(|| panic!("no .{}", class))
}

fn previews(ids: &[&str]) -> Vec<Preview> {
	ids.iter()
		.map(|id| Preview {
			id: (*id).to_owned(),
			title: format!("Recipe {}", id),
			publisher: "Publisher".to_owned(),
			image: format!("https://example.com/{}.jpg", id),
			user_generated: false,
		})
		.collect()
}

fn soup() -> Recipe {
	Recipe {
		id: "soup".to_owned(),
		title: "Tomato Soup".to_owned(),
		publisher: "Publisher".to_owned(),
		source_url: "https://example.com/soup".to_owned(),
		image: "https://example.com/soup.jpg".to_owned(),
		servings: 2,
		cooking_time: 30,
		ingredients: vec![
			Ingredient {
				quantity: Some(1.0),
				unit: "kg".to_owned(),
				description: "tomatoes".to_owned(),
			},
			Ingredient {
				quantity: None,
				unit: String::new(),
				description: "salt".to_owned(),
			},
		],
		bookmarked: false,
		user_generated: false,
	}
}

#[test]
fn selecting_a_recipe_only_moves_the_highlight() {
	init_logging();
	let mut document = Document::from_markup(r#"<ul class="results"></ul>"#).unwrap();
	let mount = find(&document, "results");
	let mut view = preview::results_view::<Document>(mount, &Config::default());

	view.render(&mut document, PreviewList::new(previews(&["a", "b", "c"]), None)).unwrap();
	let items = document.child_ids(mount).to_vec();
	let created = document.created();

	let outcome = view.render_update(&mut document, PreviewList::new(previews(&["a", "b", "c"]), Some("b".to_owned()))).unwrap();
	assert_eq!(outcome, Outcome::Patched(1));
	assert_eq!(document.child_ids(mount), &items[..]);
	assert_eq!(document.created(), created);

	let link = document.child_ids(items[1])[0];
	assert!(host::has_class(&document, &link, "preview__link--active"));
	assert_eq!(document.get_attribute(link, "href"), Some("#b"));
}

#[test]
fn empty_results_and_bookmarks_have_their_own_texts() {
	init_logging();
	let mut document = Document::from_markup(r#"<ul class="results"></ul><ul class="bookmarks__list"></ul>"#).unwrap();
	let results_mount = find(&document, "results");
	let bookmarks_mount = find(&document, "bookmarks__list");
	let config = Config::default();
	let mut results = preview::results_view::<Document>(results_mount, &config);
	let mut bookmarks = preview::bookmarks_view::<Document>(bookmarks_mount, &config);

	results.render(&mut document, PreviewList::default()).unwrap();
	assert_eq!(document.text_content(results_mount), "No recipes found for your query! Please try again ;)");

	bookmarks.render(&mut document, PreviewList::default()).unwrap();
	assert_eq!(bookmarks.state(), MountState::Error);
	assert_eq!(document.text_content(bookmarks_mount), "No recipe found. Please try another one!");

	bookmarks.render_message(&mut document, None).unwrap();
	assert_eq!(document.text_content(bookmarks_mount), "No bookmarks yet, Find a nice recipe and bookmark it.");
}

#[test]
fn results_are_paged() {
	let items = previews(&["a", "b", "c", "d", "e"]);
	let page = preview::page_slice(&items, 2, 2);
	assert_eq!(page.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), vec!["c", "d"]);
}

#[test]
fn servings_buttons_scale_the_recipe_in_place() {
	init_logging();
	let mut document = Document::from_markup(r#"<div class="recipe"></div>"#).unwrap();
	let mount = find(&document, "recipe");
	let recipe_view = Rc::new(RefCell::new(recipe::view::<Document>(mount, &Config::default())));
	recipe_view.borrow_mut().render(&mut document, soup()).unwrap();
	let title = find(&document, "recipe__title");

	let outcomes = Rc::new(RefCell::new(Vec::new()));
	let mut handlers = Handlers::<Document>::new();
	{
		let recipe_view = Rc::clone(&recipe_view);
		let outcomes = Rc::clone(&outcomes);
		recipe::add_handler_update_servings(&mut handlers, mount, move |host, servings| {
			let mut view = recipe_view.borrow_mut();
			let mut recipe = view.data().cloned().unwrap();
			recipe.update_servings(servings);
			outcomes.borrow_mut().push(view.render_update(host, recipe).unwrap());
		});
	}

	let buttons = host::find_all_by_name(&document, &mount, "button");
	let more = buttons[1];
	assert_eq!(document.get_attribute(more, "data-update-to"), Some("3"));
	let icon = document.child_ids(more)[0];
	handlers.dispatch(&mut document, &Event::new(EventKind::Click, icon));

	assert_eq!(outcomes.borrow().len(), 1);
	assert!(matches!(outcomes.borrow()[0], Outcome::Patched(n) if n > 0));
	assert_eq!(find(&document, "recipe__title"), title);
	assert_eq!(document.text_content(find(&document, "recipe__info-data--people")), "3");
	assert_eq!(document.text_content(find(&document, "recipe__quantity")), "1 1/2");
	assert_eq!(recipe_view.borrow().data().map(|r| r.servings), Some(3));
}

#[test]
fn servings_never_drop_below_one() {
	init_logging();
	let mut document = Document::from_markup(r#"<div class="recipe"></div>"#).unwrap();
	let mount = find(&document, "recipe");
	let mut view = recipe::view::<Document>(mount, &Config::default());
	view.render(&mut document, Recipe { servings: 1, ..soup() }).unwrap();

	let fewer = host::find_all_by_name(&document, &mount, "button")[0];
	assert_eq!(document.get_attribute(fewer, "data-update-to"), Some("0"));
	assert_eq!(recipe::update_servings_to(&document, &mount, &fewer), None);
}

#[test]
fn bookmarking_swaps_the_icon() {
	init_logging();
	let mut document = Document::from_markup(r#"<div class="recipe"></div>"#).unwrap();
	let mount = find(&document, "recipe");
	let recipe_view = Rc::new(RefCell::new(recipe::view::<Document>(mount, &Config::default())));
	recipe_view.borrow_mut().render(&mut document, soup()).unwrap();

	let mut handlers = Handlers::<Document>::new();
	{
		let recipe_view = Rc::clone(&recipe_view);
		recipe::add_handler_add_bookmark(&mut handlers, mount, move |host| {
			let mut view = recipe_view.borrow_mut();
			let mut recipe = view.data().cloned().unwrap();
			recipe.bookmarked = !recipe.bookmarked;
			view.render_update(host, recipe).unwrap();
		});
	}

	let bookmark = find(&document, "btn--bookmark");
	let icon = host::find_all_by_name(&document, &bookmark, "use")[0];
	assert_eq!(document.get_attribute(icon, "href"), Some("img/icons.svg#icon-bookmark"));

	handlers.dispatch(&mut document, &Event::new(EventKind::Click, icon));
	assert_eq!(document.get_attribute(icon, "href"), Some("img/icons.svg#icon-bookmark-fill"));

	// Clicks elsewhere in the recipe don't bookmark.
	let title = find(&document, "recipe__title");
	handlers.dispatch(&mut document, &Event::new(EventKind::Click, title));
	assert_eq!(document.get_attribute(icon, "href"), Some("img/icons.svg#icon-bookmark-fill"));
}

#[test]
fn recipes_render_on_load_and_hash_change() {
	let mut document = Document::new();
	let root = document.root();
	let count = Rc::new(RefCell::new(0));
	let mut handlers = Handlers::<Document>::new();
	let counter = Rc::clone(&count);
	recipe::add_handler_render(&mut handlers, &root, move |_| *counter.borrow_mut() += 1);

	handlers.dispatch(&mut document, &Event::new(EventKind::Load, root));
	handlers.dispatch(&mut document, &Event::new(EventKind::HashChange, root));
	handlers.dispatch(&mut document, &Event::new(EventKind::Click, root));
	assert_eq!(*count.borrow(), 2);
}

#[test]
fn searching_hands_over_the_query() {
	init_logging();
	let mut document = Document::from_markup(r#"<form class="search"><input class="search__field" value="pasta"><button>Search</button></form>"#).unwrap();
	let form = find(&document, "search");
	let queries = Rc::new(RefCell::new(Vec::new()));
	let mut handlers = Handlers::<Document>::new();
	{
		let queries = Rc::clone(&queries);
		search::add_handler_search(&mut handlers, form, move |_, query| queries.borrow_mut().push(query));
	}

	handlers.dispatch(&mut document, &Event::new(EventKind::Submit, form));
	handlers.dispatch(&mut document, &Event::new(EventKind::Submit, form));
	assert_eq!(*queries.borrow(), vec!["pasta".to_owned()]);
	assert_eq!(search::query(&document, &form).as_deref(), Some(""));
}

#[test]
fn upload_round_trip() {
	init_logging();
	let mut document = Document::from_markup(concat!(
		r#"<button class="nav__btn--add-recipe">Add</button>"#,
		r#"<div class="overlay hidden"></div>"#,
		r#"<div class="add-recipe-window hidden"><button class="btn--close-modal">x</button><form class="upload"></form></div>"#,
	))
	.unwrap();
	let open = find(&document, "nav__btn--add-recipe");
	let close = find(&document, "btn--close-modal");
	let backdrop = find(&document, "overlay");
	let window = find(&document, "add-recipe-window");
	let form = find(&document, "upload");

	let config = Config::default();
	let view = Rc::new(RefCell::new(upload::view::<Document>(form, window, backdrop, &config)));
	view.borrow_mut().render(&mut document, UploadForm::default()).unwrap();

	let mut handlers = Handlers::<Document>::new();
	let overlay = view.borrow().overlay().cloned().unwrap();
	assert_eq!(upload::add_handler_toggle_window(&mut handlers, &overlay, [open, close, backdrop]).len(), 3);

	let uploaded = Rc::new(RefCell::new(Vec::new()));
	{
		let view = Rc::clone(&view);
		let uploaded = Rc::clone(&uploaded);
		upload::add_handler_upload(&mut handlers, form, move |host, entries| {
			let mut view = view.borrow_mut();
			match upload::parse_upload(&entries) {
				Ok(recipe) => {
					uploaded.borrow_mut().push(recipe);
					view.render_message(host, None).unwrap();
				}
				Err(e) => view.render_error(host, Some(&e.to_string())).unwrap(),
			}
		});
	}

	handlers.dispatch(&mut document, &Event::new(EventKind::Click, open));
	assert!(view.borrow().is_window_open(&document));

	let values = [
		("title", "Soup"),
		("sourceUrl", "https://example.com"),
		("image", "https://example.com/soup.jpg"),
		("publisher", "Me"),
		("cookingTime", "20"),
		("servings", "2"),
		("ingredient-1", "1,kg,Tomatoes"),
	];
	for input in host::find_all_by_name(&document, &form, "input") {
		let name = document.get_attribute(input, "name").unwrap().to_owned();
		if let Some((_, value)) = values.iter().find(|(n, _)| *n == name) {
			document.set_attribute(&input, "value", value).unwrap();
		}
	}

	handlers.dispatch(&mut document, &Event::new(EventKind::Submit, form));
	assert_eq!(uploaded.borrow().len(), 1);
	assert_eq!(uploaded.borrow()[0].ingredients[0].description, "Tomatoes");
	assert_eq!(view.borrow().state(), MountState::Message);
	assert_eq!(document.text_content(form), "Recipe was successfully uploaded :)");

	// What the caller does once the close delay has passed.
	view.borrow_mut().hide_window(&mut document).unwrap();
	assert!(!view.borrow().is_window_open(&document));
	assert!(host::has_class(&document, &backdrop, "hidden"));

	// Reopening brings back a fresh form.
	handlers.dispatch(&mut document, &Event::new(EventKind::Click, open));
	view.borrow_mut().render(&mut document, UploadForm::default()).unwrap();
	assert_eq!(upload::form_entries(&document, &form).len(), 12);
	assert!(upload::form_entries(&document, &form).iter().all(|(_, value)| value.is_empty()));

	handlers.dispatch(&mut document, &Event::new(EventKind::Click, close));
	assert!(!view.borrow().is_window_open(&document));
}

#[test]
fn malformed_uploads_show_the_reason() {
	init_logging();
	let mut document = Document::from_markup(r#"<form class="upload"></form><div class="w"></div><div class="o"></div>"#).unwrap();
	let form = find(&document, "upload");
	let mut view = upload::view::<Document>(form, find(&document, "w"), find(&document, "o"), &Config::default());

	let error = upload::parse_upload(&[("ingredient-1".to_owned(), "just tomatoes".to_owned())]).unwrap_err();
	view.render_error(&mut document, Some(&error.to_string())).unwrap();
	assert_eq!(document.text_content(form), "Wrong ingredient format! Please use the correct format :)");
}
