//! Card components for the monthly overview and the per-category list.

use maud::{Markup, html};

use crate::{
    aggregation::{CategoryTotal, MonthlyOverview, format_currency, ukrainian_plural},
    dashboard::charts::category_colour,
};

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 p-4 rounded-lg shadow-md";
const CARD_TITLE_STYLE: &str = "text-sm font-medium text-gray-500 dark:text-gray-400";
const CARD_VALUE_STYLE: &str = "text-2xl font-bold text-gray-900 dark:text-white";
const CARD_DETAIL_STYLE: &str = "text-sm text-gray-600 dark:text-gray-400";

/// Formats a percentage value, avoiding "-0%" display.
fn format_percentage(value: f64) -> String {
    let rounded = value.round();
    if rounded.abs() < 0.5 {
        "0".to_owned()
    } else {
        format!("{:+.0}", rounded)
    }
}

/// The change from last month, e.g. "+12% порівняно з минулим місяцем".
fn change_text(change_percent: Option<f64>) -> String {
    match change_percent {
        Some(change) => format!(
            "{}% порівняно з минулим місяцем",
            format_percentage(change)
        ),
        None => "Немає витрат за минулий місяць".to_owned(),
    }
}

fn change_style(change_percent: Option<f64>) -> &'static str {
    match change_percent {
        Some(change) if change.round() >= 1.0 => "text-sm text-red-600 dark:text-red-400",
        Some(change) if change.round() <= -1.0 => "text-sm text-green-600 dark:text-green-400",
        _ => CARD_DETAIL_STYLE,
    }
}

/// The four headline numbers: all-time total, this month, average per month
/// and average per expense.
pub(super) fn overview_cards_view(overview: &MonthlyOverview) -> Markup {
    html! {
        section id="overview" class="w-full grid grid-cols-1 sm:grid-cols-2 xl:grid-cols-4 gap-4 mb-8"
        {
            div class=(CARD_STYLE)
            {
                h3 class=(CARD_TITLE_STYLE) { "Усього витрачено" }
                p class=(CARD_VALUE_STYLE) { (format_currency(overview.total)) }
                p class=(CARD_DETAIL_STYLE)
                {
                    (overview.count) " " (ukrainian_plural(overview.count))
                }
            }

            div class=(CARD_STYLE)
            {
                h3 class=(CARD_TITLE_STYLE) { "Цього місяця" }
                p class=(CARD_VALUE_STYLE) { (format_currency(overview.current_month_total)) }
                p class=(change_style(overview.change_percent))
                {
                    (change_text(overview.change_percent))
                }
            }

            div class=(CARD_STYLE)
            {
                h3 class=(CARD_TITLE_STYLE) { "Середнє за місяць" }
                p class=(CARD_VALUE_STYLE) { (format_currency(overview.average_per_month)) }
            }

            div class=(CARD_STYLE)
            {
                h3 class=(CARD_TITLE_STYLE) { "Середня витрата" }
                p class=(CARD_VALUE_STYLE) { (format_currency(overview.average_per_expense)) }
            }
        }
    }
}

/// Every category with its colour, total, share and number of expenses.
pub(super) fn category_list_view(totals: &[CategoryTotal]) -> Markup {
    let grand_total: f64 = totals.iter().map(|total| total.total).sum();

    html! {
        ul id="category-list" class="w-full divide-y divide-gray-200 dark:divide-gray-700"
        {
            @for (index, total) in totals.iter().enumerate() {
                @let share = if grand_total > 0.0 { total.total / grand_total * 100.0 } else { 0.0 };

                li class="flex items-center justify-between py-3"
                {
                    div class="flex items-center gap-3"
                    {
                        span
                            class="inline-block w-3 h-3 rounded-full"
                            style={"background-color: " (category_colour(index))}
                        {}

                        span class="font-medium text-gray-900 dark:text-white" { (total.category) }
                    }

                    div class="text-right"
                    {
                        p class="font-semibold text-gray-900 dark:text-white"
                        {
                            (format_currency(total.total))
                        }
                        p class=(CARD_DETAIL_STYLE)
                        {
                            (total.count) " " (ukrainian_plural(total.count))
                            " · " (format!("{share:.1}%"))
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::aggregation::{CategoryTotal, MonthlyOverview};

    use super::{category_list_view, change_text, format_percentage, overview_cards_view};

    #[test]
    fn percentage_has_sign_and_no_negative_zero() {
        assert_eq!(format_percentage(12.4), "+12");
        assert_eq!(format_percentage(-30.6), "-31");
        assert_eq!(format_percentage(-0.2), "0");
    }

    #[test]
    fn change_without_previous_month() {
        assert_eq!(change_text(None), "Немає витрат за минулий місяць");
        assert_eq!(
            change_text(Some(50.0)),
            "+50% порівняно з минулим місяцем"
        );
    }

    #[test]
    fn overview_cards_show_totals() {
        let overview = MonthlyOverview {
            total: 1500.0,
            count: 21,
            current_month_total: 900.0,
            previous_month_total: 600.0,
            change_percent: Some(50.0),
            average_per_month: 750.0,
            average_per_expense: 71.43,
        };

        let html = Html::parse_fragment(&overview_cards_view(&overview).into_string());

        let values = html
            .select(&Selector::parse("p").unwrap())
            .map(|p| p.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(
            values,
            vec![
                "1 500 ₴",
                "21 витрата",
                "900 ₴",
                "+50% порівняно з минулим місяцем",
                "750 ₴",
                "71 ₴",
            ]
        );
    }

    #[test]
    fn category_list_shows_count_and_share() {
        let totals = vec![
            CategoryTotal {
                category: "Їжа".to_owned(),
                total: 300.0,
                count: 3,
            },
            CategoryTotal {
                category: "Транспорт".to_owned(),
                total: 100.0,
                count: 1,
            },
        ];

        let html = Html::parse_fragment(&category_list_view(&totals).into_string());

        let details = html
            .select(&Selector::parse("li div.text-right p:last-child").unwrap())
            .map(|p| p.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(details, vec!["3 витрати · 75.0%", "1 витрата · 25.0%"]);
    }
}
