//! Chart generation and rendering for the dashboard.
//!
//! The category chart is built as an ECharts configuration and initialised by
//! a script in the page head.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisType, Color, Emphasis, EmphasisFocus, JsFunction, Tooltip, Trigger},
    series::{Pie, bar::Bar},
};
use maud::PreEscaped;

use crate::{aggregation::CategoryTotal, html::HeadElement};

/// The colours assigned to categories in order of their totals. Categories
/// past the tenth reuse the palette from the start.
pub(super) const CATEGORY_PALETTE: [&str; 10] = [
    "#3b82f6", "#f59e0b", "#10b981", "#ef4444", "#8b5cf6", "#ec4899", "#14b8a6", "#f97316",
    "#6366f1", "#84cc16",
];

/// The colour of the category at `index` in the totals list.
pub(super) fn category_colour(index: usize) -> &'static str {
    CATEGORY_PALETTE[index % CATEGORY_PALETTE.len()]
}

/// How the category breakdown is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) enum ChartKind {
    #[default]
    Pie,
    Bar,
}

impl ChartKind {
    /// Read the `chart` query parameter. Anything other than "bar" gives a pie
    /// chart.
    pub(super) fn from_query(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("bar") => ChartKind::Bar,
            _ => ChartKind::Pie,
        }
    }

    pub(super) fn as_query_value(self) -> &'static str {
        match self {
            ChartKind::Pie => "pie",
            ChartKind::Bar => "bar",
        }
    }

    pub(super) fn label(self) -> &'static str {
        match self {
            ChartKind::Pie => "Кругова",
            ChartKind::Bar => "Стовпчикова",
        }
    }
}

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Each chart follows the system colour scheme and resizes with the window.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

/// Spending per category as a pie or bar chart.
///
/// `totals` must already be sorted the way the category list shows them so
/// that both use the same colour for a category.
pub(super) fn category_chart(totals: &[CategoryTotal], kind: ChartKind) -> Chart {
    let palette = (0..totals.len().min(CATEGORY_PALETTE.len()))
        .map(|index| Color::from(category_colour(index)))
        .collect::<Vec<_>>();

    let chart = Chart::new()
        .title(Title::new().text("Витрати за категоріями").left(20).top("1%"))
        .color(palette);

    match kind {
        ChartKind::Pie => pie_chart(chart, totals),
        ChartKind::Bar => bar_chart(chart, totals),
    }
}

fn pie_chart(chart: Chart, totals: &[CategoryTotal]) -> Chart {
    let data = totals
        .iter()
        .map(|total| (total.total, total.category.as_str()))
        .collect::<Vec<_>>();

    chart
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .formatter(share_formatter("params.percent")),
        )
        .legend(Legend::new().left("center").top("bottom"))
        .series(
            Pie::new()
                .name("Категорії")
                .radius(vec!["40%", "70%"])
                .data(data),
        )
}

/// Each category is its own stacked series so that it picks up its palette
/// colour and legend entry.
fn bar_chart(mut chart: Chart, totals: &[CategoryTotal]) -> Chart {
    let grand_total: f64 = totals.iter().map(|total| total.total).sum();
    let labels = totals
        .iter()
        .map(|total| total.category.clone())
        .collect::<Vec<_>>();

    chart = chart
        .tooltip(Tooltip::new().trigger(Trigger::Item).formatter(share_formatter(
            &format!("({grand_total} > 0 ? params.value / {grand_total} * 100 : 0)"),
        )))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(60)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(hryvnia_formatter())),
        );

    for (index, total) in totals.iter().enumerate() {
        let data = (0..totals.len())
            .map(|position| if position == index { total.total } else { 0.0 })
            .collect::<Vec<_>>();

        chart = chart.series(
            Bar::new()
                .name(total.category.as_str())
                .stack("Категорії")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(data),
        );
    }

    chart
}

/// Tooltip text like "Їжа: 1 200 ₴ (35,2%)". `percent_expression` is the
/// JavaScript expression for the share of the total.
fn share_formatter(percent_expression: &str) -> JsFunction {
    JsFunction::new_with_args(
        "params",
        &format!(
            "const value = Number(params.value);
            const amount = new Intl.NumberFormat('uk-UA', {{ maximumFractionDigits: 0 }}).format(value);
            const percent = ({percent_expression}).toLocaleString('uk-UA', {{ maximumFractionDigits: 1 }});
            return value ? params.name + ': ' + amount + ' ₴ (' + percent + '%)' : '';"
        ),
    )
}

#[inline]
fn hryvnia_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const formatter = new Intl.NumberFormat('uk-UA', { maximumFractionDigits: 0 });
            return (number) ? formatter.format(number) + ' ₴' : \"-\";",
    )
}

#[cfg(test)]
mod tests {
    use crate::aggregation::CategoryTotal;

    use super::{CATEGORY_PALETTE, ChartKind, category_chart, category_colour};

    fn totals() -> Vec<CategoryTotal> {
        vec![
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
        ]
    }

    #[test]
    fn chart_kind_defaults_to_pie() {
        assert_eq!(ChartKind::from_query(None), ChartKind::Pie);
        assert_eq!(ChartKind::from_query(Some("pie")), ChartKind::Pie);
        assert_eq!(ChartKind::from_query(Some("bar")), ChartKind::Bar);
        assert_eq!(ChartKind::from_query(Some("радар")), ChartKind::Pie);
    }

    #[test]
    fn palette_wraps_after_ten_categories() {
        assert_eq!(category_colour(0), CATEGORY_PALETTE[0]);
        assert_eq!(category_colour(10), CATEGORY_PALETTE[0]);
        assert_eq!(category_colour(13), CATEGORY_PALETTE[3]);
    }

    #[test]
    fn pie_chart_has_one_slice_per_category() {
        let options =
            serde_json::to_value(category_chart(&totals(), ChartKind::Pie)).unwrap();

        let series = options["series"].as_array().unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0]["type"], "pie");
        assert_eq!(series[0]["data"].as_array().unwrap().len(), 2);
        assert_eq!(options["color"][1], CATEGORY_PALETTE[1]);
    }

    #[test]
    fn bar_chart_has_one_series_per_category() {
        let options =
            serde_json::to_value(category_chart(&totals(), ChartKind::Bar)).unwrap();

        let series = options["series"].as_array().unwrap();
        assert_eq!(series.len(), 2);
        assert!(series.iter().all(|series| series["type"] == "bar"));
        assert_eq!(series[0]["name"], "Їжа");
    }
}
