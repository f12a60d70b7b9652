use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use super::shared::{empty_state, error_text, page_shell, transaction_meta};
use super::AppContext;
use crate::controller::{self, TransactionForm};
use crate::error::ClientError;
use crate::models::{format_amount, Status, Transaction, TransactionId, CURRENCIES, OPERATION_TYPES};

#[function_component(OperacionesPage)]
pub fn operaciones_page() -> Html {
    let ctx = use_context::<AppContext>();
    let transactions = use_state(Vec::<Transaction>::new);
    let loading = use_state(|| true);
    let list_error = use_state(|| None::<String>);
    let reload = use_state(|| 0u32);

    let form_tipo = use_state(|| OPERATION_TYPES[0].to_string());
    let form_cliente = use_state(String::new);
    let form_importe = use_state(String::new);
    let form_moneda = use_state(|| CURRENCIES[0].to_string());
    // (field, message) so the message renders next to its control.
    let form_error = use_state(|| None::<(Option<&'static str>, String)>);
    let form_success = use_state(|| None::<String>);
    let saving = use_state(|| false);
    let busy_row = use_state(|| None::<TransactionId>);

    {
        let ctx = ctx.clone();
        let transactions = transactions.clone();
        let loading = loading.clone();
        let list_error = list_error.clone();
        use_effect_with_deps(
            move |_| {
                if let Some(ctx) = ctx {
                    loading.set(true);
                    spawn_local(async move {
                        match controller::load_operations(&ctx.api).await {
                            Ok(list) => {
                                transactions.set(list);
                                list_error.set(None);
                            }
                            Err(e) => list_error.set(Some(e.to_string())),
                        }
                        loading.set(false);
                    });
                }
                || ()
            },
            *reload,
        );
    }

    let on_submit = {
        let ctx = ctx.clone();
        let form_tipo = form_tipo.clone();
        let form_cliente = form_cliente.clone();
        let form_importe = form_importe.clone();
        let form_moneda = form_moneda.clone();
        let form_error = form_error.clone();
        let form_success = form_success.clone();
        let saving = saving.clone();
        let reload = reload.clone();

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let Some(ctx) = ctx.clone() else {
                return;
            };
            if *saving {
                return;
            }
            let form = TransactionForm {
                tipo: (*form_tipo).clone(),
                cliente: (*form_cliente).clone(),
                importe: (*form_importe).clone(),
                moneda: (*form_moneda).clone(),
            };
            let form_cliente = form_cliente.clone();
            let form_importe = form_importe.clone();
            let form_error = form_error.clone();
            let form_success = form_success.clone();
            let saving = saving.clone();
            let reload = reload.clone();

            form_error.set(None);
            form_success.set(None);
            saving.set(true);

            spawn_local(async move {
                match controller::create_transaction(&ctx.api, &form).await {
                    Ok(effect) => {
                        form_cliente.set(String::new());
                        form_importe.set(String::new());
                        form_success.set(Some("Operación creada correctamente".to_string()));
                        ctx.apply(effect, &reload);
                    }
                    Err(ClientError::Validation(v)) => {
                        form_error.set(Some((v.field(), v.to_string())));
                    }
                    Err(e) => {
                        form_error.set(Some((None, format!("Error al crear operación: {}", e))));
                    }
                }
                saving.set(false);
            });
        })
    };

    let on_row_action = {
        let ctx = ctx.clone();
        let busy_row = busy_row.clone();
        let list_error = list_error.clone();
        let reload = reload.clone();
        Callback::from(move |(id, next): (TransactionId, Option<Status>)| {
            let Some(ctx) = ctx.clone() else {
                return;
            };
            if busy_row.is_some() {
                return;
            }
            let busy_row = busy_row.clone();
            let list_error = list_error.clone();
            let reload = reload.clone();
            busy_row.set(Some(id.clone()));

            spawn_local(async move {
                let outcome = match next {
                    Some(estado) => controller::change_status(&ctx.api, &id, estado).await,
                    None => controller::delete_transaction(&ctx.api, &id).await,
                };
                match outcome {
                    Ok(effect) => ctx.apply(effect, &reload),
                    Err(e) => list_error.set(Some(e.to_string())),
                }
                busy_row.set(None);
            });
        })
    };

    let field_error = |field: &'static str| -> Html {
        match &*form_error {
            Some((Some(f), msg)) if *f == field => {
                html! { <p class="text-xs text-red-500 mt-1">{ msg.clone() }</p> }
            }
            _ => html! {},
        }
    };
    let general_error = match &*form_error {
        Some((None, msg)) => Some(msg.clone()),
        _ => None,
    };

    html! {
        { page_shell(
            "Operaciones",
            html! {},
            html! {
                <>
                    <form id="opForm" class="bg-card rounded-[10px] p-6 border border-border" onsubmit={on_submit}>
                        <div class="grid grid-cols-1 md:grid-cols-4 gap-3">
                            <div>
                                <select id="tipoSelect" class="w-full p-2 border rounded" onchange={{
                                    let form_tipo = form_tipo.clone();
                                    Callback::from(move |e: Event| {
                                        let select: web_sys::HtmlSelectElement = e.target_unchecked_into();
                                        form_tipo.set(select.value());
                                    })
                                }}>
                                    { for OPERATION_TYPES.iter().map(|t| html! {
                                        <option value={*t} selected={*form_tipo == *t}>{ *t }</option>
                                    }) }
                                </select>
                                { field_error("tipo") }
                            </div>
                            <input id="cliente" placeholder="Cliente" value={(*form_cliente).clone()} oninput={{
                                let form_cliente = form_cliente.clone();
                                Callback::from(move |e: InputEvent| {
                                    let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                                    form_cliente.set(input.value());
                                })
                            }} class="p-2 border rounded" />
                            <div>
                                <input id="importe" placeholder="Importe" inputmode="decimal" value={(*form_importe).clone()} oninput={{
                                    let form_importe = form_importe.clone();
                                    Callback::from(move |e: InputEvent| {
                                        let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                                        form_importe.set(input.value());
                                    })
                                }} class="w-full p-2 border rounded" />
                                { field_error("importe") }
                            </div>
                            <div class="flex gap-2">
                                <select id="moneda" class="p-2 border rounded flex-1" onchange={{
                                    let form_moneda = form_moneda.clone();
                                    Callback::from(move |e: Event| {
                                        let select: web_sys::HtmlSelectElement = e.target_unchecked_into();
                                        form_moneda.set(select.value());
                                    })
                                }}>
                                    { for CURRENCIES.iter().map(|c| html! {
                                        <option value={*c} selected={*form_moneda == *c}>{ *c }</option>
                                    }) }
                                </select>
                                <button type="submit" class="bg-accent text-white px-4 rounded" disabled={*saving}>
                                    { if *saving { "Guardando..." } else { "Guardar" } }
                                </button>
                            </div>
                        </div>
                        { error_text(&general_error) }
                        {
                            if let Some(msg) = &*form_success {
                                html! { <p class="text-sm text-green-600 mt-2">{ msg.clone() }</p> }
                            } else {
                                html! {}
                            }
                        }
                    </form>

                    { error_text(&list_error) }

                    <div id="opsList" class="bg-card rounded-[10px] border border-border px-6">
                        {
                            if *loading && transactions.is_empty() {
                                html! { <small class="text-muted-foreground">{"Cargando..."}</small> }
                            } else if transactions.is_empty() {
                                empty_state("Sin actividad")
                            } else {
                                html! {
                                    <>
                                        { for transactions.iter().map(|tx| operation_row(tx, &busy_row, &on_row_action)) }
                                    </>
                                }
                            }
                        }
                    </div>
                </>
            }
        ) }
    }
}

fn operation_row(
    tx: &Transaction,
    busy_row: &Option<TransactionId>,
    on_action: &Callback<(TransactionId, Option<Status>)>,
) -> Html {
    let actions = match &tx.id {
        Some(id) => {
            let disabled = busy_row.is_some();
            let transitions = tx.estado.next_states().into_iter().map(|next| {
                let label = format!("→ {}", next.label());
                let onclick = on_action.reform({
                    let id = id.clone();
                    move |_: MouseEvent| (id.clone(), Some(next.clone()))
                });
                html! {
                    <button {onclick} {disabled} class="text-xs px-2 py-1 rounded bg-secondary text-secondary-foreground">{ label }</button>
                }
            });
            let on_delete = on_action.reform({
                let id = id.clone();
                move |_: MouseEvent| (id.clone(), None)
            });
            html! {
                <div class="flex gap-2">
                    { for transitions }
                    <button onclick={on_delete} {disabled} class="text-xs px-2 py-1 rounded text-red-600 hover:bg-red-50">{"Eliminar"}</button>
                </div>
            }
        }
        None => html! {},
    };

    html! {
        <div class="op-item py-3 border-b border-border flex items-center justify-between gap-4">
            <div>
                <div>
                    <b class="text-foreground">{ &tx.tipo }</b>
                    { " — " }
                    { format_amount(tx.importe, &tx.moneda) }
                    <span class="ml-2 bg-secondary text-secondary-foreground px-3 py-1 rounded-full text-[10px] font-bold">{ tx.estado.label() }</span>
                </div>
                <div class="op-meta text-xs text-muted-foreground mt-1">{ transaction_meta(tx) }</div>
            </div>
            { actions }
        </div>
    }
}
