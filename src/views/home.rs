use yew::prelude::*;

use super::shared::page_shell;
use super::AppContext;
use crate::controller::Page;

#[function_component(HomePage)]
pub fn home_page() -> Html {
    let ctx = use_context::<AppContext>();
    let greeting = ctx
        .as_ref()
        .and_then(|ctx| ctx.api.session().load())
        .map(|s| format!("Hola, {}. Oficina: {}", s.username, s.branch))
        .unwrap_or_else(|| "Hola".to_string());

    html! {
        { page_shell(
            "Inicio",
            html! {},
            html! {
                <>
                    <p class="text-muted-foreground">{ greeting }</p>
                    <div class="grid grid-cols-2 md:grid-cols-3 gap-4">
                        { for Page::NAV.iter().filter(|p| **p != Page::Home).map(|page| {
                            let page = *page;
                            let onclick = {
                                let ctx = ctx.clone();
                                Callback::from(move |_| {
                                    if let Some(ctx) = ctx.as_ref() {
                                        ctx.navigate.emit(page);
                                    }
                                })
                            };
                            html! {
                                <button {onclick} class="bg-card border border-border rounded-[10px] p-6 text-left font-bold text-[#0F2A3D] hover:bg-muted/30 transition-colors">
                                    { page.title() }
                                </button>
                            }
                        }) }
                    </div>
                </>
            }
        ) }
    }
}
