use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, Document, HtmlAnchorElement, Url};

use super::runtime::CanvasRuntime;
use crate::error::RenderError;

const SVG_MIME: &str = "image/svg+xml;charset=utf-8";

/// Offer `document` as a file download. The object URL lives only for the
/// duration of the click and is revoked whether or not the click succeeded.
pub fn download_svg(
	document: &str,
	file_name: &str,
	runtime: &CanvasRuntime,
) -> Result<(), RenderError> {
	let dom = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| RenderError::Export("no document".into()))?;

	let parts = js_sys::Array::of1(&JsValue::from_str(document));
	let options = BlobPropertyBag::new();
	options.set_type(SVG_MIME);
	let blob = Blob::new_with_str_sequence_and_options(&parts, &options).map_err(js_error)?;
	let url = Url::create_object_url_with_blob(&blob).map_err(js_error)?;

	runtime.track_url(&url);
	let clicked = click_link(&dom, &url, file_name);
	runtime.release_url(&url);

	clicked?;
	log::info!("Exported graph as {file_name}");
	Ok(())
}

fn click_link(dom: &Document, url: &str, file_name: &str) -> Result<(), RenderError> {
	let anchor: HtmlAnchorElement = dom
		.create_element("a")
		.map_err(js_error)?
		.dyn_into()
		.map_err(|_| RenderError::Export("anchor element has unexpected type".into()))?;
	anchor.set_href(url);
	anchor.set_download(file_name);

	let body = dom
		.body()
		.ok_or_else(|| RenderError::Export("document has no body".into()))?;
	body.append_child(&anchor).map_err(js_error)?;
	anchor.click();
	body.remove_child(&anchor).map_err(js_error)?;
	Ok(())
}

fn js_error(err: JsValue) -> RenderError {
	RenderError::Export(format!("{:?}", err))
}
