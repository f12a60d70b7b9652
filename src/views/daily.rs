use chrono::NaiveDate;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use super::shared::{error_text, page_shell, transaction_list};
use super::AppContext;
use crate::controller;
use crate::models::Transaction;

#[function_component(DailyPage)]
pub fn daily_page() -> Html {
    let ctx = use_context::<AppContext>();
    let date = use_state(String::new);
    let items = use_state(|| None::<Vec<Transaction>>);
    let error = use_state(|| None::<String>);
    let loading = use_state(|| false);

    let on_load = {
        let date = date.clone();
        let items = items.clone();
        let error = error.clone();
        let loading = loading.clone();
        Callback::from(move |_: MouseEvent| {
            let Some(ctx) = ctx.clone() else {
                return;
            };
            if *loading {
                return;
            }
            // An empty picker means "today" on the backend.
            let fecha = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok();
            let items = items.clone();
            let error = error.clone();
            let loading = loading.clone();
            loading.set(true);
            error.set(None);

            spawn_local(async move {
                match controller::load_daily(&ctx.api, fecha).await {
                    Ok(list) => items.set(Some(list)),
                    Err(e) => error.set(Some(e.to_string())),
                }
                loading.set(false);
            });
        })
    };

    html! {
        { page_shell(
            "Daily",
            html! {},
            html! {
                <>
                    <div class="flex gap-2">
                        <input id="dailyDate" type="date" value={(*date).clone()} oninput={{
                            let date = date.clone();
                            Callback::from(move |e: InputEvent| {
                                let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                                date.set(input.value());
                            })
                        }} class="p-2 border rounded" />
                        <button id="loadDaily" onclick={on_load} disabled={*loading} class="bg-primary text-primary-foreground px-4 rounded-lg font-semibold">
                            { if *loading { "Cargando..." } else { "Cargar" } }
                        </button>
                    </div>
                    { error_text(&error) }
                    <div id="dailyList">
                        {
                            match &*items {
                                Some(list) => transaction_list(list, "Sin movimientos"),
                                None => html! {},
                            }
                        }
                    </div>
                </>
            }
        ) }
    }
}
