use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use super::shared::{error_text, page_shell, transaction_list};
use super::AppContext;
use crate::controller::{self, SafeSummary};
use crate::models::{format_amount, DEFAULT_CURRENCY};

#[function_component(CajaPage)]
pub fn caja_page() -> Html {
    let ctx = use_context::<AppContext>();
    let summary = use_state(|| None::<SafeSummary>);
    let error = use_state(|| None::<String>);

    {
        let summary = summary.clone();
        let error = error.clone();
        use_effect_with_deps(
            move |_| {
                if let Some(ctx) = ctx {
                    spawn_local(async move {
                        match controller::load_safe(&ctx.api).await {
                            Ok(loaded) => summary.set(Some(loaded)),
                            Err(e) => error.set(Some(e.to_string())),
                        }
                    });
                }
                || ()
            },
            (),
        );
    }

    let total = (*summary)
        .as_ref()
        .map(|s| s.balance.total)
        .unwrap_or(0.0);

    html! {
        { page_shell(
            "Caja fuerte",
            html! {},
            html! {
                <>
                    <div class="bg-card p-6 rounded-[10px] shadow-sm border border-border">
                        <p class="text-muted-foreground text-[10px] font-bold mb-1 tracking-widest">{"SALDO"}</p>
                        <h3 id="safeBalance" class="text-2xl font-bold text-[#1D617A] tracking-tight">
                            { format_amount(total, DEFAULT_CURRENCY) }
                        </h3>
                    </div>
                    { error_text(&error) }
                    <div id="safeMovs">
                        <h3 class="font-bold text-foreground text-lg mb-3">{"Últimos movimientos"}</h3>
                        {
                            match &*summary {
                                Some(s) => transaction_list(&s.recent, "Sin movimientos"),
                                None => html! { <small class="text-muted-foreground">{"Cargando..."}</small> },
                            }
                        }
                    </div>
                </>
            }
        ) }
    }
}
