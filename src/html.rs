use maud::{DOCTYPE, Markup, PreEscaped, html};

// Button styles
pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 bg-indigo-600 \
    dark:bg-indigo-600 disabled:bg-indigo-400 hover:enabled:bg-indigo-700 \
    text-white font-bold rounded shadow-md";

pub const BUTTON_SECONDARY_STYLE: &str = "w-full py-2 px-4 text-sm font-medium \
    text-gray-900 bg-white rounded border border-gray-200 hover:bg-gray-100 \
    hover:text-indigo-700 dark:bg-gray-800 dark:text-gray-400 \
    dark:border-gray-600 dark:hover:text-white dark:hover:bg-gray-700";

pub const BUTTON_EDIT_STYLE: &str = "text-blue-500 hover:text-blue-700 \
    underline bg-transparent border-none cursor-pointer";

pub const BUTTON_DELETE_STYLE: &str = "text-red-600 hover:text-red-500 \
    dark:text-red-500 dark:hover:text-red-400 underline bg-transparent \
    border-none cursor-pointer";

// Form styles
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white disabled:text-gray-500 bg-gray-50 \
    dark:bg-gray-700 border border-gray-300 dark:border-gray-600 \
    dark:placeholder-gray-400 focus:ring-indigo-500 focus:border-indigo-500";

// Transaction row styles
pub const INCOME_ROW_STYLE: &str = "p-4 rounded flex justify-between items-center \
    shadow-sm bg-green-50 border-l-4 border-green-500 dark:bg-gray-800";
pub const EXPENSE_ROW_STYLE: &str = "p-4 rounded flex justify-between items-center \
    shadow-sm bg-red-50 border-l-4 border-red-500 dark:bg-gray-800";
pub const INCOME_AMOUNT_STYLE: &str = "text-green-600 dark:text-green-400";
pub const EXPENSE_AMOUNT_STYLE: &str = "text-red-600 dark:text-red-400";

// Alert styles
pub const ALERT_SUCCESS_STYLE: &str = "p-4 mb-4 rounded text-green-800 bg-green-50 \
    border border-green-300 dark:bg-gray-800 dark:text-green-400";
pub const ALERT_ERROR_STYLE: &str = "p-4 mb-4 rounded text-red-800 bg-red-50 \
    border border-red-300 dark:bg-gray-800 dark:text-red-400";

// Page container
pub const PAGE_CONTAINER_STYLE: &str = "max-w-4xl mx-auto p-6 rounded-lg shadow-xl \
    bg-white dark:bg-gray-800 text-gray-900 dark:text-white";

pub enum HeadElement {
    Style(PreEscaped<String>),
}

pub fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Finance Tracker" }

                script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                script src="https://cdn.jsdelivr.net/npm/htmx.org@2.0.8/dist/htmx.min.js" {}

                style
                {
                    r#"
                    .htmx-indicator {
                        display: none;
                    }

                    .htmx-request .htmx-indicator {
                        display: inline;
                    }

                    .htmx-request.htmx-indicator {
                        display: inline;
                    }

                    .htmx-request .submit-label {
                        display: none;
                    }
                    "#
                }

                @for element in head_elements
                {
                    @match element
                    {
                        HeadElement::Style(text) => style { (text) }
                    }
                }
            }

            body class="container max-w-full min-h-screen p-8 bg-gray-100 dark:bg-gray-900 font-sans"
            {
                (content)
            }
        }
    }
}

pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    // Template adapted from https://flowbite.com/blocks/marketing/404/
    let content = html!(
        section class="bg-white dark:bg-gray-900"
        {
            div class="py-8 px-4 mx-auto max-w-screen-xl lg:py-16 lg:px-6"
            {
                div class="mx-auto max-w-screen-sm text-center"
                {
                    h1
                        class="mb-4 text-7xl tracking-tight font-extrabold
                            lg:text-9xl text-indigo-600 dark:text-indigo-500"
                    {
                        (header)
                    }

                    p
                        class="mb-4 text-3xl md:text-4xl tracking-tight
                            font-bold text-gray-900 dark:text-white"
                    {
                        (description)
                    }

                    p
                        class="mb-4 text-1xl md:text-2xl tracking-tight
                            text-gray-900 dark:text-white"
                    {
                        (fix)
                    }

                    a
                        href="/"
                        class="inline-flex text-white bg-indigo-600
                            hover:bg-indigo-800 focus:ring-4 focus:outline-hidden
                            focus:ring-indigo-300 font-medium rounded text-sm px-5
                            py-2.5 text-center dark:focus:ring-indigo-900 my-4"
                    {
                        "Back to Tracker"
                    }
                }
            }
        }
    );

    base(title, &[], &content)
}

pub fn loading_spinner() -> Markup {
    // Spinner SVG adapted from https://flowbite.com/docs/components/spinner/
    html! {
        svg
            aria-hidden="true"
            role="status"
            class="inline text-white w-4 h-4 me-2 mb-1 animate-spin"
            viewBox="0 0 100 101"
            fill="none"
            xmlns="http://www.w3.org/2000/svg"
        {
            path
                d="M100 50.5908C100 78.2051 77.6142 100.591 50 100.591C22.3858 100.591 0 78.2051 0 50.5908C0 22.9766 22.3858 0.59082 50 0.59082C77.6142 0.59082 100 22.9766 100 50.5908ZM9.08144 50.5908C9.08144 73.1895 27.4013 91.5094 50 91.5094C72.5987 91.5094 90.9186 73.1895 90.9186 50.5908C90.9186 27.9921 72.5987 9.67226 50 9.67226C27.4013 9.67226 9.08144 27.9921 9.08144 50.5908Z"
                fill="#E5E7EB" {}
            path
                d="M93.9676 39.0409C96.393 38.4038 97.8624 35.9116 97.0079 33.5539C95.2932 28.8227 92.871 24.3692 89.8167 20.348C85.8452 15.1192 80.8826 10.7238 75.2124 7.41289C69.5422 4.10194 63.2754 1.94025 56.7698 1.05124C51.7666 0.367541 46.6976 0.446843 41.7345 1.27873C39.2613 1.69328 37.813 4.19778 38.4501 6.62326C39.0873 9.04874 41.5694 10.4717 44.0505 10.1071C47.8511 9.54855 51.7191 9.52689 55.5402 10.0491C60.8642 10.7766 65.9928 12.5457 70.6331 15.2552C75.2735 17.9648 79.3347 21.5619 82.5849 25.841C84.9175 28.9121 86.7997 32.2913 88.1811 35.8758C89.083 38.2158 91.5421 39.6781 93.9676 39.0409Z"
                fill="currentColor" {}
        }
    }
}

/// Returns the CSS styles for adding a dollar sign prefix to number inputs.
pub fn dollar_input_styles() -> HeadElement {
    HeadElement::Style(PreEscaped(
        r#"
        .input-wrapper {
            position: relative;
            display: inline-block;
        }
        .input-wrapper input[type="number"] {
            padding-left: 1.4rem;
        }
        .input-wrapper::before {
            content: '$';
            position: absolute;
            left: 0.6rem;
            top: 50%;
            transform: translateY(-50%);
            pointer-events: none;
        }
        "#
        .to_owned(),
    ))
}
