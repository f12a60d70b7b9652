use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use super::AppContext;
use crate::controller;

#[function_component(LoginPage)]
pub fn login_page() -> Html {
    let ctx = use_context::<AppContext>();
    let username = use_state(String::new);
    let pin = use_state(String::new);
    let error = use_state(|| None::<String>);
    let loading = use_state(|| false);

    let on_submit = {
        let username = username.clone();
        let pin = pin.clone();
        let error = error.clone();
        let loading = loading.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let Some(ctx) = ctx.clone() else {
                return;
            };
            if *loading {
                return;
            }
            let username_val = (*username).clone();
            let pin_val = (*pin).clone();
            let error = error.clone();
            let loading = loading.clone();

            loading.set(true);
            error.set(None);
            spawn_local(async move {
                match controller::login(&ctx.api, &username_val, &pin_val).await {
                    Ok(effect) => ctx.apply_navigation(effect),
                    Err(e) => error.set(Some(e.to_string())),
                }
                loading.set(false);
            });
        })
    };

    html! {
        <div class="min-h-screen flex items-center justify-center bg-background">
            <div class="w-full max-w-md bg-card border border-border rounded-2xl shadow-lg p-8">
                <div class="text-center mb-6">
                    <h1 class="text-2xl font-bold text-foreground">{"EAXY"}</h1>
                    <p class="text-sm text-muted-foreground mt-2">{"Introduce tu usuario y PIN"}</p>
                </div>

                <form class="space-y-4" onsubmit={on_submit}>
                    <div class="space-y-1">
                        <label class="text-sm font-medium text-foreground">{"Usuario"}</label>
                        <input
                            id="username"
                            class="w-full px-4 py-2 bg-input border border-input rounded-lg text-foreground focus:outline-none focus:ring-2 focus:ring-primary"
                            value={(*username).clone()}
                            oninput={{
                                let username = username.clone();
                                Callback::from(move |e: InputEvent| {
                                    let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                                    username.set(input.value());
                                })
                            }}
                        />
                    </div>
                    <div class="space-y-1">
                        <label class="text-sm font-medium text-foreground">{"PIN"}</label>
                        <input
                            id="password"
                            type="password"
                            inputmode="numeric"
                            class="w-full px-4 py-2 bg-input border border-input rounded-lg text-foreground focus:outline-none focus:ring-2 focus:ring-primary"
                            value={(*pin).clone()}
                            oninput={{
                                let pin = pin.clone();
                                Callback::from(move |e: InputEvent| {
                                    let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                                    pin.set(input.value());
                                })
                            }}
                        />
                    </div>

                    if let Some(msg) = &*error {
                        <div id="loginMsg" class="text-sm text-red-500">{ msg.clone() }</div>
                    }

                    <button
                        type="submit"
                        class="w-full bg-primary text-primary-foreground py-2 rounded-lg font-semibold hover:opacity-90 transition-opacity"
                        disabled={*loading}
                    >
                        { if *loading { "Conectando..." } else { "Entrar" } }
                    </button>
                </form>
            </div>
        </div>
    }
}
