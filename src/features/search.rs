//! The search form. It's static page content, so there's no [`View`](`crate::view::View`) here.

use crate::{
	events::{EventKind, Handlers, SubscriptionId},
	host::{self, Host, HostError},
	loggable,
};
use core::hash::Hash;
use tracing::{debug, error, trace};

const FIELD: &str = "search__field";

/// The search field's current value. An input's value is its `value` attribute.
#[must_use]
pub fn query<H: Host + ?Sized>(host: &H, form: &H::Node) -> Option<String> {
	let field = host::find_by_class(host, form, FIELD)?;
	Some(host.attribute(&field, "value").unwrap_or_default())
}

/// Empties the search field, if there is one.
///
/// # Errors
///
/// Iff the host fails.
pub fn clear_input<H: Host + ?Sized>(host: &mut H, form: &H::Node) -> Result<(), HostError> {
	match host::find_by_class(host, form, FIELD) {
		Some(field) => host.set_attribute(&field, "value", ""),
		None => Ok(()),
	}
}

/// [`query`], then [`clear_input`]. Blank queries are [`None`].
///
/// # Errors
///
/// Iff the host fails to clear the field.
pub fn take_query<H: Host + ?Sized>(host: &mut H, form: &H::Node) -> Result<Option<String>, HostError> {
	let query = query(host, form);
	clear_input(host, form)?;
	let query = query.map(|q| q.trim().to_owned()).filter(|q| !q.is_empty());
	trace!(query = query.as_deref().map(loggable));
	Ok(query)
}

/// Calls `handler` with the query whenever `form` is submitted with a non-blank one.
pub fn add_handler_search<H>(handlers: &mut Handlers<H>, form: H::Node, mut handler: impl FnMut(&mut H, String) + 'static) -> SubscriptionId
where
	H: Host,
	H::Node: Hash + Eq + 'static,
{
	handlers.subscribe(form.clone(), EventKind::Submit, move |host, _| match take_query(host, &form) {
		Ok(Some(query)) => handler(host, query),
		Ok(None) => debug!("Blank search. Ignoring."),
		Err(e) => error!("Could not read the search field: {}", e),
	})
}
