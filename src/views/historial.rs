use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use super::shared::{error_text, page_shell, transaction_list};
use super::AppContext;
use crate::controller;
use crate::models::Transaction;

#[function_component(HistorialPage)]
pub fn historial_page() -> Html {
    let ctx = use_context::<AppContext>();
    let items = use_state(Vec::<Transaction>::new);
    let loading = use_state(|| true);
    let error = use_state(|| None::<String>);

    {
        let items = items.clone();
        let loading = loading.clone();
        let error = error.clone();
        use_effect_with_deps(
            move |_| {
                if let Some(ctx) = ctx {
                    spawn_local(async move {
                        match controller::load_history(&ctx.api).await {
                            Ok(list) => items.set(list),
                            Err(e) => error.set(Some(e.to_string())),
                        }
                        loading.set(false);
                    });
                }
                || ()
            },
            (),
        );
    }

    html! {
        { page_shell(
            "Historial",
            html! {},
            html! {
                <div id="histList">
                    { error_text(&error) }
                    {
                        if *loading {
                            html! { <small class="text-muted-foreground">{"Cargando..."}</small> }
                        } else {
                            transaction_list(&items, "Sin historiales")
                        }
                    }
                </div>
            }
        ) }
    }
}
