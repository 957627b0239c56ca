//! The fields shared by the new and edit expense forms, and validation of
//! the submitted values.

use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    aggregation::parse_date,
    category::CategoryRegistry,
    expense::{CategoryChoice, parse_amount},
    html::{FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
};

/// The value of the category option that reveals the custom category input.
pub const CUSTOM_CATEGORY_OPTION: &str = "__custom__";

/// The form data for creating or editing an expense.
///
/// Every field is kept as text so that the submitted values can be put back
/// into the form when validation fails.
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseFormData {
    pub amount: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub custom_category: String,
    pub date: String,
    #[serde(default)]
    pub comment: String,
}

/// Submitted expense fields that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedExpenseForm {
    pub amount: f64,
    pub date: Date,
    pub category: CategoryChoice,
    pub comment: Option<String>,
}

impl ExpenseFormData {
    /// Check the amount, date and category choice.
    ///
    /// A custom category is only checked for existence here. Its name is
    /// validated when it is added to the registry.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidAmount], [Error::InvalidExpenseDate] or
    /// [Error::MissingCategory] for the first field that is not valid.
    pub fn validate(&self) -> Result<ValidatedExpenseForm, Error> {
        let amount = parse_amount(&self.amount)?;
        let date =
            parse_date(&self.date).ok_or_else(|| Error::InvalidExpenseDate(self.date.clone()))?;

        let category = match self.category.trim() {
            "" => return Err(Error::MissingCategory),
            CUSTOM_CATEGORY_OPTION if self.custom_category.trim().is_empty() => {
                return Err(Error::EmptyCategoryName);
            }
            CUSTOM_CATEGORY_OPTION => CategoryChoice::Custom(self.custom_category.clone()),
            name => CategoryChoice::Existing(name.to_owned()),
        };

        let comment = Some(self.comment.trim().to_owned()).filter(|comment| !comment.is_empty());

        Ok(ValidatedExpenseForm {
            amount,
            date,
            category,
            comment,
        })
    }
}

/// The values to show in the expense form.
pub struct ExpenseFormValues<'a> {
    pub amount: &'a str,
    pub category: &'a str,
    pub custom_category: &'a str,
    pub date: &'a str,
    pub comment: &'a str,
}

impl<'a> ExpenseFormValues<'a> {
    /// Echo back what the user submitted.
    pub fn from_form(form: &'a ExpenseFormData) -> Self {
        Self {
            amount: &form.amount,
            category: &form.category,
            custom_category: &form.custom_category,
            date: &form.date,
            comment: &form.comment,
        }
    }
}

/// Render the amount, category, date and comment inputs.
///
/// `error_message` is shown below the fields.
pub fn expense_form_fields(
    values: &ExpenseFormValues<'_>,
    categories: &CategoryRegistry,
    error_message: Option<&str>,
) -> Markup {
    let is_custom = values.category == CUSTOM_CATEGORY_OPTION;
    let toggle_custom = format!(
        "document.getElementById('custom-category-field').classList.toggle('hidden', this.value !== '{CUSTOM_CATEGORY_OPTION}')"
    );

    html! {
        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Сума" }

            // w-full needed to ensure input takes the full width when prefilled with a value
            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    min="0"
                    placeholder="0.00"
                    value=(values.amount)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label for="category" class=(FORM_LABEL_STYLE) { "Категорія" }

            select
                name="category"
                id="category"
                required
                onchange=(toggle_custom)
                class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" disabled selected[values.category.is_empty()] { "Оберіть категорію" }

                @for category in categories.iter() {
                    option
                        value=(category.name)
                        selected[values.category == category.name.as_ref()]
                    { (category.name) }
                }

                option value=(CUSTOM_CATEGORY_OPTION) selected[is_custom] { "Власна" }
            }
        }

        div id="custom-category-field" class=[(!is_custom).then_some("hidden")]
        {
            label for="custom_category" class=(FORM_LABEL_STYLE) { "Назва власної категорії" }

            input
                name="custom_category"
                id="custom_category"
                type="text"
                placeholder="Наприклад, Подарунки"
                value=(values.custom_category)
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="date" class=(FORM_LABEL_STYLE) { "Дата" }

            input
                name="date"
                id="date"
                type="date"
                value=(values.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="comment" class=(FORM_LABEL_STYLE) { "Коментар" }

            input
                name="comment"
                id="comment"
                type="text"
                placeholder="Необов'язково"
                value=(values.comment)
                class=(FORM_TEXT_INPUT_STYLE);
        }

        @if let Some(error_message) = error_message {
            p class=(FORM_ERROR_STYLE) { (error_message) }
        }
    }
}
