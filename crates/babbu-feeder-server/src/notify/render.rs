// SPDX-License-Identifier: Apache-2.0

use babbu_feeder_model::{CatProfile, DietPlan, MealAllocation};
use chrono::NaiveDate;

/// Formats a gram amount without trailing zeros: 50.0 renders as "50",
/// 59.4 stays "59.4".
fn format_amount(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if (rounded - rounded.trunc()).abs() < f64::EPSILON {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn meal_cell(meal: &MealAllocation) -> String {
    let food = escape_html(&meal.food);
    match meal.grams {
        Some(grams) => format!("{food} — {}g", format_amount(grams)),
        None => {
            let qty = meal.qty.map(format_amount).unwrap_or_else(|| "?".to_string());
            let unit = meal.unit.as_deref().unwrap_or("units");
            format!("{food} — {qty} {unit} per meal")
        }
    }
}

/// The fixed daily summary template: cat name, daily calorie target and
/// life-stage label when known, then one row per meal.
#[must_use]
pub fn daily_email_html(profile: &CatProfile, plan: &DietPlan, on: NaiveDate) -> String {
    let name = escape_html(profile.display_name());
    let mut body = String::new();
    body.push_str("<html><body>\n");
    body.push_str(&format!("<h2>Daily diet plan for {name}</h2>\n"));
    body.push_str(&format!("<p>Date: {on}</p>\n"));
    if let Some(total) = plan.total_kcal_per_day {
        body.push_str(&format!(
            "<p>Daily target: {} kcal</p>\n",
            format_amount(total)
        ));
    }
    if let Some(stage) = plan.life_stage.or(profile.life_stage_override) {
        body.push_str(&format!("<p>Life stage: {}</p>\n", stage.label()));
    }
    body.push_str("<table border=\"1\" cellpadding=\"6\">\n");
    body.push_str("<tr><th>Meal</th><th>Food</th></tr>\n");
    for (index, meal) in plan.meals.iter().enumerate() {
        body.push_str(&format!(
            "<tr><td>Meal {}</td><td>{}</td></tr>\n",
            index + 1,
            meal_cell(meal)
        ));
    }
    body.push_str("</table>\n");
    body.push_str("</body></html>\n");
    body
}

/// Subject line for the daily summary.
#[must_use]
pub fn daily_email_subject(profile: &CatProfile, on: NaiveDate) -> String {
    format!("Daily diet plan for {} ({on})", profile.display_name())
}
