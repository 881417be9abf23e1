//! HTML rendering for the web pages. All user data goes through [`escape`].

use super::{
    list::{detail_path, LIST_PATH},
    Notification, VehicleDetailView, VehicleListView, ViewState,
};
use crate::vehicles::{NewVehicleForm, TyreType, Vehicle, VehicleType};
use std::fmt::Write as _;

pub const APP_TITLE: &str = "AutoBuddy";

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0;background:#f8fafc;color:#0f172a}\
header{display:flex;justify-content:space-between;align-items:center;padding:1rem 2rem;background:#fff;border-bottom:1px solid #e2e8f0}\
main{max-width:960px;margin:2rem auto;padding:0 1rem}\
table{width:100%;border-collapse:collapse;background:#fff}\
th,td{text-align:left;padding:.5rem;border-bottom:1px solid #e2e8f0}\
tr.row:hover{background:#f1f5f9}\
.toast{padding:.75rem 1rem;margin-bottom:1rem;border-radius:.375rem}\
.toast-success{background:#dcfce7}.toast-error{background:#fee2e2}\
dialog{border:1px solid #cbd5e1;border-radius:.5rem;padding:1.5rem}\
dl{display:grid;grid-template-columns:max-content 1fr;gap:.5rem 1.5rem}\
label{display:block;margin:.5rem 0}";

/// Escape text for HTML element content and double-quoted attributes.
#[must_use]
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, signed_in_as: Option<&str>, body: &str) -> String {
    let nav = signed_in_as.map_or_else(String::new, |email| {
        format!(
            r#"<nav><span>{}</span> <form method="post" action="/logout" style="display:inline"><button type="submit">Sign out</button></form></nav>"#,
            escape(email)
        )
    });

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | {APP_TITLE}</title>
<style>{STYLE}</style>
</head>
<body>
<header><a href="/dashboard"><strong>{APP_TITLE}</strong></a>{nav}</header>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

fn toast(notification: Option<&Notification>) -> String {
    notification.map_or_else(String::new, |n| {
        format!(
            r#"<div class="toast toast-{}" role="status">{}</div>"#,
            n.level.as_str(),
            escape(&n.message)
        )
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthPage {
    Login,
    Register,
}

impl AuthPage {
    const fn action(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/register",
        }
    }

    const fn title(self) -> &'static str {
        match self {
            Self::Login => "Sign in",
            Self::Register => "Create account",
        }
    }
}

/// Sign-in or sign-up form; `email` is echoed back after a failed attempt.
#[must_use]
pub fn auth_page(page: AuthPage, email: &str, error: Option<&str>) -> String {
    let notice = error.map(Notification::error);
    let alternative = match page {
        AuthPage::Login => r#"<p>No account yet? <a href="/register">Register</a></p>"#,
        AuthPage::Register => r#"<p>Already registered? <a href="/login">Sign in</a></p>"#,
    };

    let body = format!(
        r#"<h1>{title}</h1>
{toast}
<form method="post" action="{action}">
<label>Email <input type="email" name="email" value="{email}" required autocomplete="email"></label>
<label>Password <input type="password" name="password" required minlength="6"></label>
<button type="submit">{title}</button>
</form>
{alternative}"#,
        title = page.title(),
        toast = toast(notice.as_ref()),
        action = page.action(),
        email = escape(email),
    );

    layout(page.title(), None, &body)
}

/// Vehicle table plus the creation dialog when it is open.
#[must_use]
pub fn list_page(view: &VehicleListView, signed_in_as: Option<&str>) -> String {
    let mut rows = String::new();
    for vehicle in &view.vehicles {
        let href = escape(&detail_path(&vehicle.plate));
        let _ = write!(
            rows,
            r#"<tr class="row"><td><a href="{href}">{}</a></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
            escape(&vehicle.plate),
            escape(&vehicle.kind),
            escape(&vehicle.current_mileage),
            escape(&vehicle.tyres.brand),
            escape(&vehicle.tyres.kind),
        );
    }
    if view.vehicles.is_empty() {
        rows.push_str(r#"<tr><td colspan="5">No vehicles yet.</td></tr>"#);
    }

    let dialog = if view.dialog_open {
        creation_dialog(&view.form)
    } else {
        String::new()
    };

    let body = format!(
        r#"<h1>Vehicles</h1>
{toast}
<p><a href="{LIST_PATH}?new=1">Add Vehicle</a></p>
<table>
<thead><tr><th>Plate</th><th>Type</th><th>Current Mileage</th><th>Tyre Brand</th><th>Tyre Type</th></tr></thead>
<tbody>{rows}</tbody>
</table>
{dialog}"#,
        toast = toast(view.notification.as_ref()),
    );

    layout("Vehicles", signed_in_as, &body)
}

fn select(name: &str, selected: &str, options: &[(&str, &str)]) -> String {
    let mut html = format!(r#"<select name="{name}">"#);
    for (value, label) in options {
        let marker = if *value == selected { " selected" } else { "" };
        let _ = write!(
            html,
            r#"<option value="{}"{marker}>{}</option>"#,
            escape(value),
            escape(label)
        );
    }
    html.push_str("</select>");
    html
}

fn input(label: &str, name: &str, value: &str, required: bool) -> String {
    format!(
        r#"<label>{label} <input type="text" name="{name}" value="{}"{}></label>"#,
        escape(value),
        if required { " required" } else { "" }
    )
}

fn creation_dialog(form: &NewVehicleForm) -> String {
    let vehicle_types: Vec<(&str, &str)> = VehicleType::ALL
        .iter()
        .map(|t| (t.as_str(), t.label()))
        .collect();
    let tyre_types: Vec<(&str, &str)> = TyreType::ALL
        .iter()
        .map(|t| (t.as_str(), t.as_str()))
        .collect();

    format!(
        r#"<dialog open>
<h2>Add New Vehicle</h2>
<form method="post" action="{LIST_PATH}">
{plate}
{mileage}
<label>Vehicle Type {vehicle_type}</label>
<h3>Tyre Information</h3>
{brand}
<label>Tyre Type {tyre_type}</label>
{width}
{aspect_ratio}
{rim_diameter}
{date_changed}
{max_mileage}
{when_changed}
<label>Notes <textarea name="tyre_notes">{notes}</textarea></label>
<button type="submit">Add Vehicle</button>
<a href="{LIST_PATH}">Cancel</a>
</form>
</dialog>"#,
        plate = input("Plate Number", "plate", &form.plate, true),
        mileage = input("Current Mileage", "current_mileage", &form.current_mileage, true),
        vehicle_type = select("vehicle_type", &form.vehicle_type, &vehicle_types),
        brand = input("Brand", "tyre_brand", &form.tyre_brand, true),
        tyre_type = select("tyre_type", &form.tyre_type, &tyre_types),
        width = input("Width", "tyre_width", &form.tyre_width, true),
        aspect_ratio = input("Aspect Ratio", "tyre_aspect_ratio", &form.tyre_aspect_ratio, true),
        rim_diameter = input("Rim Diameter", "tyre_rim_diameter", &form.tyre_rim_diameter, true),
        date_changed = input("Date Changed", "tyre_date_changed", &form.tyre_date_changed, false),
        max_mileage = input("Max Mileage", "tyre_max_mileage", &form.tyre_max_mileage, true),
        when_changed = input(
            "Mileage When Changed",
            "tyre_mileage_when_changed",
            &form.tyre_mileage_when_changed,
            false
        ),
        notes = escape(&form.tyre_notes),
    )
}

fn field(label: &str, value: &str) -> String {
    format!("<dt>{label}</dt><dd>{}</dd>", escape(value))
}

fn vehicle_details(vehicle: &Vehicle) -> String {
    let tyre = &vehicle.tyres;
    let notes = if tyre.has_notes() {
        field("Notes", &tyre.notes)
    } else {
        String::new()
    };

    format!(
        r#"<h1>{plate}</h1>
<section>
<h2>Vehicle Information</h2>
<dl>{plate_field}{kind}{mileage}</dl>
</section>
<section>
<h2>Tyre Information</h2>
<dl>{brand}{tyre_type}{size}{date}{max}{when}{notes}</dl>
</section>"#,
        plate = escape(&vehicle.plate),
        plate_field = field("Plate Number", &vehicle.plate),
        kind = field("Vehicle Type", &vehicle.kind),
        mileage = field("Current Mileage", &vehicle.current_mileage),
        brand = field("Brand", &tyre.brand),
        tyre_type = field("Type", &tyre.kind),
        size = field("Size", &tyre.size()),
        date = field("Date Changed", &tyre.date_changed),
        max = field("Max Mileage", &tyre.max_mileage),
        when = field("Mileage When Changed", &tyre.vehicle_mileage_when_changed),
    )
}

/// Detail page; anything but a loaded vehicle renders the not-found panel.
#[must_use]
pub fn detail_page(view: &VehicleDetailView, signed_in_as: Option<&str>) -> String {
    let content = match (&view.state, &view.vehicle) {
        (ViewState::Ready, Some(vehicle)) => vehicle_details(vehicle),
        (ViewState::Initializing | ViewState::Loading, _) => "<p>Loading...</p>".to_string(),
        _ => format!(
            r#"<h1>Vehicle Not Found</h1>
<p><a href="{LIST_PATH}">Back to Vehicles</a></p>"#
        ),
    };

    let body = format!(
        r#"{toast}
<p><a href="{LIST_PATH}">&larr; Vehicles</a></p>
{content}"#,
        toast = toast(view.notification.as_ref()),
    );

    let title = view
        .vehicle
        .as_ref()
        .map_or("Vehicle", |vehicle| vehicle.plate.as_str());
    layout(title, signed_in_as, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicles::Tyre;

    fn abc123(notes: &str) -> Vehicle {
        Vehicle {
            plate: "ABC123".to_string(),
            current_mileage: "10000".to_string(),
            kind: "car".to_string(),
            tyres: Tyre {
                width: "205".to_string(),
                aspect_ratio: "55".to_string(),
                rim_diameter: "16".to_string(),
                brand: "Michelin".to_string(),
                kind: "Summer Tyres".to_string(),
                date_changed: "1/1/2024".to_string(),
                max_mileage: "60000".to_string(),
                vehicle_mileage_when_changed: "5000".to_string(),
                notes: notes.to_string(),
            },
        }
    }

    fn ready(vehicle: Vehicle) -> VehicleDetailView {
        VehicleDetailView {
            state: ViewState::Ready,
            vehicle: Some(vehicle),
            notification: None,
        }
    }

    #[test]
    fn escape_special_characters() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn detail_without_notes_has_no_notes_row() {
        let html = detail_page(&ready(abc123("")), Some("u1@example.com"));
        assert!(html.contains("205/55R16"));
        assert!(html.contains("<dt>Mileage When Changed</dt><dd>5000</dd>"));
        assert!(!html.contains("<dt>Notes</dt>"));
    }

    #[test]
    fn detail_with_notes_has_notes_row() {
        let html = detail_page(&ready(abc123("rotated at 20k")), None);
        assert!(html.contains("<dt>Notes</dt><dd>rotated at 20k</dd>"));
    }

    #[test]
    fn not_found_links_back_to_list() {
        let view = VehicleDetailView {
            state: ViewState::NotFound,
            vehicle: None,
            notification: Some(Notification::error("Vehicle not found")),
        };
        let html = detail_page(&view, None);
        assert!(html.contains("Vehicle Not Found"));
        assert!(html.contains(r#"<a href="/dashboard/vehicles">Back to Vehicles</a>"#));
        assert!(html.contains("toast-error"));
    }

    #[test]
    fn list_escapes_user_data_and_links_rows() {
        let mut vehicle = abc123("");
        vehicle.tyres.brand = "<script>".to_string();
        let view = VehicleListView {
            state: ViewState::Ready,
            vehicles: vec![vehicle],
            ..VehicleListView::new()
        };
        let html = list_page(&view, Some("u1@example.com"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains(r#"href="/dashboard/vehicles/ABC123""#));
        assert!(!html.contains("<dialog"));
    }

    #[test]
    fn open_dialog_keeps_form_values() {
        let mut view = VehicleListView::new();
        view.dialog_open = true;
        view.form.plate = "XYZ789".to_string();
        view.form.tyre_type = "All Season Tyres".to_string();

        let html = list_page(&view, None);
        assert!(html.contains("<dialog open>"));
        assert!(html.contains(r#"name="plate" value="XYZ789" required"#));
        assert!(html.contains(r#"<option value="All Season Tyres" selected>"#));
        assert!(html.contains(r#"<option value="car" selected>Car</option>"#));
    }

    #[test]
    fn empty_list_says_so() {
        let html = list_page(&VehicleListView::new(), None);
        assert!(html.contains("No vehicles yet."));
        assert!(html.contains("<title>Vehicles | AutoBuddy</title>"));
    }

    #[test]
    fn auth_page_echoes_email_and_error() {
        let html = auth_page(AuthPage::Login, "a\"b@example.com", Some("invalid email or password"));
        assert!(html.contains(r#"value="a&quot;b@example.com""#));
        assert!(html.contains("invalid email or password"));
        assert!(html.contains(r#"action="/login""#));
        assert!(html.contains(r#"href="/register""#));
    }
}
